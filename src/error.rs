use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a snapshot from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("table '{table}' is missing required column '{column}'")]
    SchemaViolation { table: &'static str, column: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("table '{table}': {reason}")]
    Malformed { table: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
