use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use crate::models::{
    DashboardReport, DexPoolCount, PoolDexMapping, PoolReserve, PoolTvl, PoolValuation,
    PoolVolume, SnapshotTables, TraderSummary, TurnoverRow, TxCounts, UtilizationRow,
    VolumeWindow, WindowVolume,
};

/// Rows that can be joined on the pool name
trait PoolKey {
    fn pool_name(&self) -> &str;
}

impl PoolKey for PoolReserve {
    fn pool_name(&self) -> &str {
        &self.name
    }
}

impl PoolKey for PoolValuation {
    fn pool_name(&self) -> &str {
        &self.name
    }
}

impl PoolKey for PoolDexMapping {
    fn pool_name(&self) -> &str {
        &self.name
    }
}

/// name -> matching rows, each list kept in table order
fn index_by_name<T: PoolKey>(rows: &[T]) -> HashMap<&str, Vec<&T>> {
    let mut index: HashMap<&str, Vec<&T>> = HashMap::new();
    for row in rows {
        index.entry(row.pool_name()).or_default().push(row);
    }
    index
}

/// `numerator / denominator`, defined only for a strictly positive denominator
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d).filter(|r| r.is_finite()),
        _ => None,
    }
}

// fold from +0.0: an empty f64 `sum()` yields -0.0
fn sum_present(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().fold(0.0, |acc, v| acc + v)
}

fn sum_counts(windows: &[TxCounts], field: fn(&TxCounts) -> Option<u64>) -> u64 {
    windows
        .iter()
        .filter_map(field)
        .fold(0u64, |acc, v| acc.saturating_add(v))
}

/// Null reserves sort after every known value
fn by_reserve_desc(a: &PoolTvl, b: &PoolTvl) -> Ordering {
    match (a.reserve_usd, b.reserve_usd) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Computes dashboard metrics from the five snapshot tables.
///
/// Stateless: every method reads the borrowed tables and allocates fresh
/// output, so calling it twice on the same tables gives identical results.
/// No method fails; undefined values come back as `None`.
pub struct MetricsDeriver<'a> {
    tables: &'a SnapshotTables,
}

impl<'a> MetricsDeriver<'a> {
    pub fn new(tables: &'a SnapshotTables) -> Self {
        Self { tables }
    }

    /// Sum of all known reserve values
    pub fn total_value_locked(&self) -> f64 {
        sum_present(self.tables.reserves.iter().map(|r| r.reserve_usd))
    }

    /// Sum of every known volume cell, across all pools and windows
    pub fn total_volume(&self) -> f64 {
        sum_present(
            self.tables
                .volumes
                .iter()
                .flat_map(|v| v.volume_usd.iter().copied()),
        )
    }

    /// 24h volume over reserve for pools present in both tables
    pub fn turnover_ratios(&self) -> Vec<TurnoverRow> {
        let reserves = index_by_name(&self.tables.reserves);

        self.tables
            .volumes
            .iter()
            .flat_map(|vol| {
                reserves
                    .get(vol.name.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |res| TurnoverRow {
                        name: vol.name.clone(),
                        volume_24h_usd: vol.volume_24h(),
                        reserve_usd: res.reserve_usd,
                        turnover_ratio: ratio(vol.volume_24h(), res.reserve_usd),
                    })
            })
            .collect()
    }

    /// Reserve over FDV for pools present in both tables
    pub fn liquidity_utilization(&self) -> Vec<UtilizationRow> {
        let valuations = index_by_name(&self.tables.valuations);

        self.tables
            .reserves
            .iter()
            .flat_map(|res| {
                valuations
                    .get(res.name.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |val| UtilizationRow {
                        name: res.name.clone(),
                        reserve_usd: res.reserve_usd,
                        fdv_usd: val.fdv_usd,
                        liquidity_utilization: ratio(res.reserve_usd, val.fdv_usd),
                    })
            })
            .collect()
    }

    /// Per-pool totals over all transaction windows, nulls skipped
    pub fn trader_summary(&self) -> Vec<TraderSummary> {
        self.tables
            .transactions
            .iter()
            .map(|tx| TraderSummary {
                name: tx.name.clone(),
                total_buys: sum_counts(&tx.windows, |c| c.buys),
                total_sells: sum_counts(&tx.windows, |c| c.sells),
                total_buyers: sum_counts(&tx.windows, |c| c.buyers),
                total_sellers: sum_counts(&tx.windows, |c| c.sellers),
            })
            .collect()
    }

    /// Number of distinct reserve-table pools per DEX.
    ///
    /// Pools without a mapping are counted under `dex: None`, which is
    /// listed after the named DEXes.
    pub fn pools_per_dex(&self) -> Vec<DexPoolCount> {
        let mappings = index_by_name(&self.tables.dex_mappings);
        let mut named: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut unmapped: BTreeSet<&str> = BTreeSet::new();

        for reserve in &self.tables.reserves {
            let pool = reserve.name.as_str();
            match mappings.get(pool) {
                Some(rows) => {
                    for row in rows {
                        match row.dex.as_deref() {
                            Some(dex) => {
                                named.entry(dex).or_default().insert(pool);
                            }
                            None => {
                                unmapped.insert(pool);
                            }
                        }
                    }
                }
                None => {
                    unmapped.insert(pool);
                }
            }
        }

        let mut counts: Vec<DexPoolCount> = named
            .into_iter()
            .map(|(dex, pools)| DexPoolCount {
                dex: Some(dex.to_string()),
                num_pools: pools.len(),
            })
            .collect();

        if !unmapped.is_empty() {
            counts.push(DexPoolCount {
                dex: None,
                num_pools: unmapped.len(),
            });
        }

        counts
    }

    /// Reserve rows, largest first. `limit` truncates the list.
    pub fn top_pools_by_tvl(&self, limit: Option<usize>) -> Vec<PoolTvl> {
        let mut pools: Vec<PoolTvl> = self
            .tables
            .reserves
            .iter()
            .map(|r| PoolTvl {
                name: r.name.clone(),
                reserve_usd: r.reserve_usd,
            })
            .collect();

        pools.sort_by(by_reserve_desc);
        if let Some(limit) = limit {
            pools.truncate(limit);
        }
        pools
    }

    /// Volume table melted to one row per (pool, window)
    pub fn volume_by_window(&self) -> Vec<WindowVolume> {
        self.tables
            .volumes
            .iter()
            .flat_map(|vol: &PoolVolume| {
                VolumeWindow::ALL.into_iter().map(move |window| WindowVolume {
                    name: vol.name.clone(),
                    window,
                    volume_usd: vol.volume(window),
                })
            })
            .collect()
    }

    /// Mean of the defined turnover ratios; `None` when there are none.
    pub fn average_turnover(&self) -> Option<f64> {
        Self::mean_turnover(&self.turnover_ratios())
    }

    fn mean_turnover(rows: &[TurnoverRow]) -> Option<f64> {
        let defined: Vec<f64> = rows.iter().filter_map(|r| r.turnover_ratio).collect();
        if defined.is_empty() {
            return None;
        }
        let total = defined.iter().fold(0.0, |acc, v| acc + v);
        Some(total / defined.len() as f64)
    }

    pub fn derive(&self, top_pools_limit: Option<usize>) -> DashboardReport {
        let turnover = self.turnover_ratios();
        let report = DashboardReport {
            total_value_locked: self.total_value_locked(),
            total_volume: self.total_volume(),
            average_turnover: Self::mean_turnover(&turnover),
            top_pools: self.top_pools_by_tvl(top_pools_limit),
            volume_by_window: self.volume_by_window(),
            turnover,
            utilization: self.liquidity_utilization(),
            traders: self.trader_summary(),
            pools_per_dex: self.pools_per_dex(),
        };

        tracing::debug!(
            "Derived report: tvl={:.2} volume={:.2} turnover_rows={} dex_groups={}",
            report.total_value_locked,
            report.total_volume,
            report.turnover.len(),
            report.pools_per_dex.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoolTransactions;

    fn volume(name: &str, vol_24h: Option<f64>) -> PoolVolume {
        PoolVolume::new(name, [Some(1.0), None, Some(2.0), None, None, vol_24h])
    }

    fn counts(buys: Option<u64>) -> TxCounts {
        TxCounts {
            buys,
            sells: Some(1),
            buyers: None,
            sellers: Some(2),
        }
    }

    fn sample() -> SnapshotTables {
        SnapshotTables {
            reserves: vec![
                PoolReserve::new("X", Some(1000.0)),
                PoolReserve::new("ZERO", Some(0.0)),
                PoolReserve::new("NULL", None),
                PoolReserve::new("BIG", Some(5000.0)),
            ],
            volumes: vec![
                volume("X", Some(250.0)),
                volume("ZERO", Some(40.0)),
                volume("ORPHAN", Some(99.0)),
            ],
            valuations: vec![
                PoolValuation::new("X", Some(4000.0)),
                PoolValuation::new("BIG", Some(0.0)),
            ],
            dex_mappings: vec![
                PoolDexMapping::new("X", Some("UniswapV3".into())),
                PoolDexMapping::new("BIG", Some("SushiSwap".into())),
            ],
            transactions: vec![PoolTransactions::new(
                "X",
                [counts(Some(5)), counts(None), counts(Some(3)), counts(None)],
            )],
        }
    }

    #[test]
    fn empty_tables_give_zero_totals_and_empty_outputs() {
        let tables = SnapshotTables::default();
        let deriver = MetricsDeriver::new(&tables);

        assert_eq!(deriver.total_value_locked(), 0.0);
        assert!(deriver.total_value_locked().is_sign_positive());
        assert_eq!(deriver.total_volume(), 0.0);
        assert!(deriver.turnover_ratios().is_empty());
        assert!(deriver.liquidity_utilization().is_empty());
        assert!(deriver.trader_summary().is_empty());
        assert!(deriver.pools_per_dex().is_empty());
        assert!(deriver.top_pools_by_tvl(None).is_empty());
        assert!(deriver.volume_by_window().is_empty());
        assert_eq!(deriver.average_turnover(), None);
    }

    #[test]
    fn totals_skip_nulls() {
        let tables = sample();
        let deriver = MetricsDeriver::new(&tables);

        assert_eq!(deriver.total_value_locked(), 6000.0);
        // each row: 1 + 2 + vol_24h
        assert_eq!(deriver.total_volume(), 3.0 * 3.0 + 250.0 + 40.0 + 99.0);
    }

    #[test]
    fn turnover_is_volume_over_reserve() {
        let tables = SnapshotTables {
            reserves: vec![PoolReserve::new("X", Some(1000.0))],
            volumes: vec![volume("X", Some(250.0))],
            ..Default::default()
        };
        let rows = MetricsDeriver::new(&tables).turnover_ratios();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].turnover_ratio, Some(0.25));
    }

    #[test]
    fn turnover_drops_pools_missing_a_reserve_row() {
        let tables = sample();
        let rows = MetricsDeriver::new(&tables).turnover_ratios();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["X", "ZERO"]);
    }

    #[test]
    fn zero_reserve_yields_null_ratios() {
        let tables = SnapshotTables {
            reserves: vec![PoolReserve::new("Z", Some(0.0))],
            volumes: vec![volume("Z", Some(10.0))],
            valuations: vec![PoolValuation::new("Z", Some(100.0))],
            ..Default::default()
        };
        let deriver = MetricsDeriver::new(&tables);

        assert_eq!(deriver.turnover_ratios()[0].turnover_ratio, None);
        // 0 / 100 is a defined utilization
        assert_eq!(deriver.liquidity_utilization()[0].liquidity_utilization, Some(0.0));
        assert!(deriver.total_volume().is_finite());
        assert!(deriver.total_value_locked().is_finite());
    }

    #[test]
    fn negative_or_missing_denominators_are_undefined() {
        assert_eq!(ratio(Some(1.0), Some(-2.0)), None);
        assert_eq!(ratio(Some(1.0), None), None);
        assert_eq!(ratio(None, Some(2.0)), None);
        assert_eq!(ratio(Some(f64::MAX), Some(0.5)), None);
        assert_eq!(ratio(Some(3.0), Some(2.0)), Some(1.5));
    }

    #[test]
    fn utilization_follows_reserve_order_and_guards_zero_fdv() {
        let tables = sample();
        let rows = MetricsDeriver::new(&tables).liquidity_utilization();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "X");
        assert_eq!(rows[0].liquidity_utilization, Some(0.25));
        assert_eq!(rows[1].name, "BIG");
        assert_eq!(rows[1].liquidity_utilization, None);
    }

    #[test]
    fn duplicate_keys_join_pairwise() {
        let tables = SnapshotTables {
            reserves: vec![
                PoolReserve::new("D", Some(100.0)),
                PoolReserve::new("D", Some(200.0)),
            ],
            volumes: vec![volume("D", Some(50.0))],
            ..Default::default()
        };
        let rows = MetricsDeriver::new(&tables).turnover_ratios();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].turnover_ratio, Some(0.5));
        assert_eq!(rows[1].turnover_ratio, Some(0.25));
    }

    #[test]
    fn trader_sums_ignore_nulls() {
        let tables = sample();
        let summary = MetricsDeriver::new(&tables).trader_summary();

        assert_eq!(
            summary,
            vec![TraderSummary {
                name: "X".into(),
                total_buys: 8,
                total_sells: 4,
                total_buyers: 0,
                total_sellers: 8,
            }]
        );
    }

    #[test]
    fn trader_summary_ignores_other_tables() {
        let tables = SnapshotTables {
            transactions: vec![PoolTransactions::new("ONLY_TX", [TxCounts::default(); 4])],
            ..Default::default()
        };
        let summary = MetricsDeriver::new(&tables).trader_summary();

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total_buys, 0);
    }

    #[test]
    fn pools_per_dex_counts_unmapped_pools_as_null_group() {
        let tables = SnapshotTables {
            reserves: vec![
                PoolReserve::new("A", Some(1.0)),
                PoolReserve::new("B", Some(2.0)),
                PoolReserve::new("C", Some(3.0)),
            ],
            dex_mappings: vec![
                PoolDexMapping::new("A", Some("UniswapV3".into())),
                PoolDexMapping::new("B", Some("UniswapV3".into())),
                // not in the reserve table, so never counted
                PoolDexMapping::new("Q", Some("Curve".into())),
            ],
            ..Default::default()
        };
        let counts = MetricsDeriver::new(&tables).pools_per_dex();

        assert_eq!(
            counts,
            vec![
                DexPoolCount {
                    dex: Some("UniswapV3".into()),
                    num_pools: 2,
                },
                DexPoolCount {
                    dex: None,
                    num_pools: 1,
                },
            ]
        );
    }

    #[test]
    fn pools_per_dex_counts_each_pool_once() {
        let tables = SnapshotTables {
            reserves: vec![
                PoolReserve::new("A", Some(1.0)),
                PoolReserve::new("A", Some(1.0)),
            ],
            dex_mappings: vec![PoolDexMapping::new("A", Some("Balancer".into()))],
            ..Default::default()
        };
        let counts = MetricsDeriver::new(&tables).pools_per_dex();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].num_pools, 1);
    }

    #[test]
    fn top_pools_sort_descending_with_nulls_last() {
        let tables = sample();
        let deriver = MetricsDeriver::new(&tables);
        let names: Vec<String> = deriver
            .top_pools_by_tvl(None)
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["BIG", "X", "ZERO", "NULL"]);
        assert_eq!(deriver.top_pools_by_tvl(Some(2)).len(), 2);
    }

    #[test]
    fn volume_melts_to_one_row_per_window() {
        let tables = sample();
        let rows = MetricsDeriver::new(&tables).volume_by_window();

        assert_eq!(rows.len(), 3 * VolumeWindow::ALL.len());
        assert_eq!(rows[0].window, VolumeWindow::M5);
        assert_eq!(rows[5].window, VolumeWindow::H24);
        assert_eq!(rows[5].volume_usd, Some(250.0));
        assert_eq!(rows[1].volume_usd, None);
    }

    #[test]
    fn average_turnover_skips_undefined_ratios() {
        let tables = SnapshotTables {
            reserves: vec![
                PoolReserve::new("A", Some(100.0)),
                PoolReserve::new("B", Some(0.0)),
                PoolReserve::new("C", Some(100.0)),
            ],
            volumes: vec![
                volume("A", Some(50.0)),
                volume("B", Some(50.0)),
                volume("C", Some(150.0)),
            ],
            ..Default::default()
        };

        assert_eq!(MetricsDeriver::new(&tables).average_turnover(), Some(1.0));
    }

    #[test]
    fn derive_is_idempotent() {
        let tables = sample();
        let deriver = MetricsDeriver::new(&tables);
        let first = deriver.derive(Some(10));
        let second = deriver.derive(Some(10));

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
