use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::{Map, Value};
use crate::config::SnapshotConfig;
use crate::error::LoadError;
use crate::models::{
    PoolDexMapping, PoolReserve, PoolTransactions, PoolValuation, PoolVolume, SnapshotTables,
    TxCounts, TxWindow, VolumeWindow,
};
use super::{coerce, Snapshot, SnapshotSource, Table};

type Record = Map<String, Value>;

const NAME: &str = "name";
const RESERVE: &str = "pair_reserve_in_usd";
const FDV: &str = "fdv_usd";
const DEX: &str = "dex";
const TX_KINDS: [&str; 4] = ["buys", "sells", "buyers", "sellers"];

/// Reads `<data_dir>/<prefix>_<table>.json` record files.
///
/// Each file holds a JSON array of row objects, e.g.
/// `[{"name": "WETH / USDT", "pair_reserve_in_usd": "1520334.2"}]`.
pub struct JsonSnapshotSource {
    data_dir: PathBuf,
    prefix: String,
}

impl JsonSnapshotSource {
    pub fn new(data_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.data_dir.clone(), config.prefix.clone())
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.json", self.prefix, table.name()))
    }

    /// Snapshot files that do not exist yet
    pub fn missing_files(&self) -> Vec<PathBuf> {
        Table::ALL
            .into_iter()
            .map(|table| self.table_path(table))
            .filter(|path| !path.is_file())
            .collect()
    }

    async fn read_records(&self, table: Table) -> Result<Vec<Record>, LoadError> {
        let path = self.table_path(table);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
        parse_records(table, &path, &bytes)
    }
}

#[async_trait]
impl SnapshotSource for JsonSnapshotSource {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn load(&self) -> Result<Snapshot, LoadError> {
        let (tvl, volume, fdv, dex, transactions) = tokio::try_join!(
            self.read_records(Table::Tvl),
            self.read_records(Table::Volume),
            self.read_records(Table::Fdv),
            self.read_records(Table::Dex),
            self.read_records(Table::Transactions),
        )?;

        let tables = SnapshotTables {
            reserves: parse_reserves(&tvl)?,
            volumes: parse_volumes(&volume)?,
            valuations: parse_valuations(&fdv)?,
            dex_mappings: parse_dex_mappings(&dex)?,
            transactions: parse_transactions(&transactions)?,
        };

        tracing::debug!(
            "Loaded snapshot from {}: {} reserves, {} volumes, {} valuations, {} dex rows, {} tx rows",
            self.data_dir.display(),
            tables.reserves.len(),
            tables.volumes.len(),
            tables.valuations.len(),
            tables.dex_mappings.len(),
            tables.transactions.len()
        );

        Ok(Snapshot::new(self.name(), tables))
    }
}

fn parse_records(table: Table, path: &Path, bytes: &[u8]) -> Result<Vec<Record>, LoadError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(rows) = value else {
        return Err(LoadError::Malformed {
            table: table.name(),
            reason: "expected a JSON array of records".to_string(),
        });
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(record) => Ok(record),
            other => Err(LoadError::Malformed {
                table: table.name(),
                reason: format!("row {} is not an object: {}", i, other),
            }),
        })
        .collect()
}

/// A column counts as present if any row carries the key.
fn require_columns<S: AsRef<str>>(
    table: Table,
    records: &[Record],
    columns: &[S],
) -> Result<(), LoadError> {
    if records.is_empty() {
        return Ok(());
    }
    for column in columns {
        let column = column.as_ref();
        if !records.iter().any(|r| r.contains_key(column)) {
            return Err(LoadError::SchemaViolation {
                table: table.name(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn row_name(table: Table, index: usize, record: &Record) -> Option<String> {
    let name = coerce::text(record.get(NAME));
    if name.is_none() {
        tracing::warn!("Skipping {} row {} without a pool name", table.name(), index);
    }
    name
}

fn tx_column(kind: &str, window: TxWindow) -> String {
    format!("{}_{}", kind, window.label())
}

pub(crate) fn parse_reserves(records: &[Record]) -> Result<Vec<PoolReserve>, LoadError> {
    require_columns(Table::Tvl, records, &[NAME, RESERVE])?;

    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let name = row_name(Table::Tvl, i, r)?;
            Some(PoolReserve::new(name, coerce::decimal(r.get(RESERVE))))
        })
        .collect())
}

pub(crate) fn parse_volumes(records: &[Record]) -> Result<Vec<PoolVolume>, LoadError> {
    let columns: Vec<String> = VolumeWindow::ALL.into_iter().map(|w| w.column()).collect();
    require_columns(Table::Volume, records, &[NAME])?;
    require_columns(Table::Volume, records, columns.as_slice())?;

    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let name = row_name(Table::Volume, i, r)?;
            let volume_usd = VolumeWindow::ALL.map(|w| coerce::decimal(r.get(&w.column())));
            Some(PoolVolume::new(name, volume_usd))
        })
        .collect())
}

pub(crate) fn parse_valuations(records: &[Record]) -> Result<Vec<PoolValuation>, LoadError> {
    require_columns(Table::Fdv, records, &[NAME, FDV])?;

    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let name = row_name(Table::Fdv, i, r)?;
            Some(PoolValuation::new(name, coerce::decimal(r.get(FDV))))
        })
        .collect())
}

pub(crate) fn parse_dex_mappings(records: &[Record]) -> Result<Vec<PoolDexMapping>, LoadError> {
    require_columns(Table::Dex, records, &[NAME, DEX])?;

    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let name = row_name(Table::Dex, i, r)?;
            Some(PoolDexMapping::new(name, coerce::text(r.get(DEX))))
        })
        .collect())
}

pub(crate) fn parse_transactions(records: &[Record]) -> Result<Vec<PoolTransactions>, LoadError> {
    let columns: Vec<String> = TX_KINDS
        .into_iter()
        .flat_map(|kind| TxWindow::ALL.into_iter().map(move |w| tx_column(kind, w)))
        .collect();
    require_columns(Table::Transactions, records, &[NAME])?;
    require_columns(Table::Transactions, records, columns.as_slice())?;

    Ok(records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let name = row_name(Table::Transactions, i, r)?;
            let windows = TxWindow::ALL.map(|w| TxCounts {
                buys: coerce::count(r.get(&tx_column("buys", w))),
                sells: coerce::count(r.get(&tx_column("sells", w))),
                buyers: coerce::count(r.get(&tx_column("buyers", w))),
                sellers: coerce::count(r.get(&tx_column("sellers", w))),
            });
            Some(PoolTransactions::new(name, windows))
        })
        .collect())
}
