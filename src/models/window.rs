use serde::{Deserialize, Serialize};

/// Trade-volume windows carried by the volume snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VolumeWindow {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "24h")]
    H24,
}

impl VolumeWindow {
    pub const ALL: [VolumeWindow; 6] = [
        VolumeWindow::M5,
        VolumeWindow::M15,
        VolumeWindow::M30,
        VolumeWindow::H1,
        VolumeWindow::H6,
        VolumeWindow::H24,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VolumeWindow::M5 => "5m",
            VolumeWindow::M15 => "15m",
            VolumeWindow::M30 => "30m",
            VolumeWindow::H1 => "1h",
            VolumeWindow::H6 => "6h",
            VolumeWindow::H24 => "24h",
        }
    }

    /// Snapshot column name, e.g. `vol_24h`
    pub fn column(&self) -> String {
        format!("vol_{}", self.label())
    }
}

/// Windows carried by the transaction-count snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TxWindow {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "24h")]
    H24,
}

impl TxWindow {
    pub const ALL: [TxWindow; 4] = [TxWindow::M5, TxWindow::M15, TxWindow::H1, TxWindow::H24];

    pub fn label(&self) -> &'static str {
        match self {
            TxWindow::M5 => "5m",
            TxWindow::M15 => "15m",
            TxWindow::H1 => "1h",
            TxWindow::H24 => "24h",
        }
    }
}
