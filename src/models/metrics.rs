use serde::{Deserialize, Serialize};
use super::VolumeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRow {
    pub name: String,
    pub volume_24h_usd: Option<f64>,
    pub reserve_usd: Option<f64>,
    pub turnover_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationRow {
    pub name: String,
    pub reserve_usd: Option<f64>,
    pub fdv_usd: Option<f64>,
    pub liquidity_utilization: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderSummary {
    pub name: String,
    pub total_buys: u64,
    pub total_sells: u64,
    pub total_buyers: u64,
    pub total_sellers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexPoolCount {
    pub dex: Option<String>,
    pub num_pools: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTvl {
    pub name: String,
    pub reserve_usd: Option<f64>,
}

/// Long-form volume cell (one pool, one window)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowVolume {
    pub name: String,
    pub window: VolumeWindow,
    pub volume_usd: Option<f64>,
}

/// Every derived output of a snapshot, ready to serialize for the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub total_value_locked: f64,
    pub total_volume: f64,
    pub average_turnover: Option<f64>,
    pub top_pools: Vec<PoolTvl>,
    pub volume_by_window: Vec<WindowVolume>,
    pub turnover: Vec<TurnoverRow>,
    pub utilization: Vec<UtilizationRow>,
    pub traders: Vec<TraderSummary>,
    pub pools_per_dex: Vec<DexPoolCount>,
}
