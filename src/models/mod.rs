pub mod pool;
pub mod metrics;
pub mod window;

pub use pool::{
    PoolDexMapping, PoolReserve, PoolTransactions, PoolValuation, PoolVolume, SnapshotTables,
    TxCounts,
};
pub use metrics::{
    DashboardReport, DexPoolCount, PoolTvl, TraderSummary, TurnoverRow, UtilizationRow,
    WindowVolume,
};
pub use window::{TxWindow, VolumeWindow};
