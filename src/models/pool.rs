use serde::{Deserialize, Serialize};
use super::{TxWindow, VolumeWindow};

/// Reserve (TVL) row of a single pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolReserve {
    pub name: String,
    pub reserve_usd: Option<f64>,
}

impl PoolReserve {
    pub fn new(name: impl Into<String>, reserve_usd: Option<f64>) -> Self {
        Self {
            name: name.into(),
            reserve_usd,
        }
    }
}

/// Trade volume of a pool, one cell per `VolumeWindow`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolVolume {
    pub name: String,
    pub volume_usd: [Option<f64>; 6],
}

impl PoolVolume {
    pub fn new(name: impl Into<String>, volume_usd: [Option<f64>; 6]) -> Self {
        Self {
            name: name.into(),
            volume_usd,
        }
    }

    pub fn volume(&self, window: VolumeWindow) -> Option<f64> {
        self.volume_usd[window as usize]
    }

    pub fn volume_24h(&self) -> Option<f64> {
        self.volume(VolumeWindow::H24)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolValuation {
    pub name: String,
    pub fdv_usd: Option<f64>,
}

impl PoolValuation {
    pub fn new(name: impl Into<String>, fdv_usd: Option<f64>) -> Self {
        Self {
            name: name.into(),
            fdv_usd,
        }
    }
}

/// Which DEX hosts a pool. `dex` is `None` when the snapshot left it blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDexMapping {
    pub name: String,
    pub dex: Option<String>,
}

impl PoolDexMapping {
    pub fn new(name: impl Into<String>, dex: Option<String>) -> Self {
        Self {
            name: name.into(),
            dex,
        }
    }
}

/// Buy/sell activity inside one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCounts {
    pub buys: Option<u64>,
    pub sells: Option<u64>,
    pub buyers: Option<u64>,
    pub sellers: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTransactions {
    pub name: String,
    pub windows: [TxCounts; 4],
}

impl PoolTransactions {
    pub fn new(name: impl Into<String>, windows: [TxCounts; 4]) -> Self {
        Self {
            name: name.into(),
            windows,
        }
    }

    pub fn counts(&self, window: TxWindow) -> &TxCounts {
        &self.windows[window as usize]
    }
}

/// The five tables of one snapshot, as handed to the deriver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTables {
    pub reserves: Vec<PoolReserve>,
    pub volumes: Vec<PoolVolume>,
    pub valuations: Vec<PoolValuation>,
    pub dex_mappings: Vec<PoolDexMapping>,
    pub transactions: Vec<PoolTransactions>,
}

impl SnapshotTables {
    pub fn is_empty(&self) -> bool {
        self.reserves.is_empty()
            && self.volumes.is_empty()
            && self.valuations.is_empty()
            && self.dex_mappings.is_empty()
            && self.transactions.is_empty()
    }
}
