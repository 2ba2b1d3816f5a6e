pub mod coerce;
pub mod json;

use async_trait::async_trait;
use serde::Serialize;
use crate::error::LoadError;
use crate::models::SnapshotTables;

pub use json::JsonSnapshotSource;

/// Supplies the five snapshot tables, freshly read on every call.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<Snapshot, LoadError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub source: &'static str,
    pub loaded_at: i64,
    pub tables: SnapshotTables,
}

impl Snapshot {
    pub fn new(source: &'static str, tables: SnapshotTables) -> Self {
        Self {
            source,
            loaded_at: chrono::Utc::now().timestamp(),
            tables,
        }
    }
}

/// The five snapshot artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Tvl,
    Volume,
    Fdv,
    Dex,
    Transactions,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Tvl,
        Table::Volume,
        Table::Fdv,
        Table::Dex,
        Table::Transactions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Tvl => "tvl",
            Table::Volume => "volume",
            Table::Fdv => "fdv",
            Table::Dex => "dex",
            Table::Transactions => "transactions",
        }
    }
}
