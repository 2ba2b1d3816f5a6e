use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use crate::error::LoadError;
use crate::models::{
    DashboardReport, DexPoolCount, PoolTvl, TraderSummary, TurnoverRow, UtilizationRow,
    WindowVolume,
};
use crate::services::MetricsDeriver;
use crate::sources::{Snapshot, SnapshotSource};

#[derive(Debug, Default)]
pub struct LoadStats {
    pub loads: AtomicU64,
    pub failures: AtomicU64,
}

pub struct AppState {
    pub source: Arc<dyn SnapshotSource>,
    pub stats: LoadStats,
    pub top_pools_limit: Option<usize>,
}

impl AppState {
    pub fn new(source: Arc<dyn SnapshotSource>, top_pools_limit: Option<usize>) -> Self {
        Self {
            source,
            stats: LoadStats::default(),
            top_pools_limit,
        }
    }

    /// Every request reads the snapshot afresh
    async fn load(&self) -> Result<Snapshot, ApiError> {
        match self.source.load().await {
            Ok(snapshot) => {
                self.stats.loads.fetch_add(1, Ordering::Relaxed);
                Ok(snapshot)
            }
            Err(e) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Snapshot load from {} failed: {}", self.source.name(), e);
                Err(ApiError(e))
            }
        }
    }
}

pub struct ApiError(LoadError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub loaded_at: i64,
    #[serde(flatten)]
    pub report: DashboardReport,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub loaded_at: i64,
    pub total_value_locked: f64,
    pub total_volume: f64,
    pub average_turnover: Option<f64>,
    pub pool_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TvlQuery {
    pub limit: Option<usize>,
}

/// GET /dashboard - every derived output in one document
async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardResponse>, ApiError> {
    let snapshot = state.load().await?;
    let report = MetricsDeriver::new(&snapshot.tables).derive(state.top_pools_limit);
    Ok(Json(DashboardResponse {
        loaded_at: snapshot.loaded_at,
        report,
    }))
}

/// GET /metrics/summary - headline numbers
async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<SummaryResponse>, ApiError> {
    let snapshot = state.load().await?;
    let deriver = MetricsDeriver::new(&snapshot.tables);
    Ok(Json(SummaryResponse {
        loaded_at: snapshot.loaded_at,
        total_value_locked: deriver.total_value_locked(),
        total_volume: deriver.total_volume(),
        average_turnover: deriver.average_turnover(),
        pool_count: snapshot.tables.reserves.len(),
    }))
}

/// GET /pools/tvl?limit=N
async fn pools_tvl(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TvlQuery>,
) -> Result<Json<Vec<PoolTvl>>, ApiError> {
    let snapshot = state.load().await?;
    let limit = query.limit.or(state.top_pools_limit);
    Ok(Json(MetricsDeriver::new(&snapshot.tables).top_pools_by_tvl(limit)))
}

/// GET /pools/volume
async fn pools_volume(State(state): State<Arc<AppState>>) -> Result<Json<Vec<WindowVolume>>, ApiError> {
    let snapshot = state.load().await?;
    Ok(Json(MetricsDeriver::new(&snapshot.tables).volume_by_window()))
}

/// GET /pools/turnover
async fn pools_turnover(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TurnoverRow>>, ApiError> {
    let snapshot = state.load().await?;
    Ok(Json(MetricsDeriver::new(&snapshot.tables).turnover_ratios()))
}

/// GET /pools/utilization
async fn pools_utilization(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UtilizationRow>>, ApiError> {
    let snapshot = state.load().await?;
    Ok(Json(MetricsDeriver::new(&snapshot.tables).liquidity_utilization()))
}

/// GET /traders
async fn traders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TraderSummary>>, ApiError> {
    let snapshot = state.load().await?;
    Ok(Json(MetricsDeriver::new(&snapshot.tables).trader_summary()))
}

/// GET /dex/pools
async fn dex_pools(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DexPoolCount>>, ApiError> {
    let snapshot = state.load().await?;
    Ok(Json(MetricsDeriver::new(&snapshot.tables).pools_per_dex()))
}

/// GET /stats
async fn stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "source": state.source.name(),
        "loads": state.stats.loads.load(Ordering::Relaxed),
        "failures": state.stats.failures.load(Ordering::Relaxed),
    }))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

pub fn create_rest_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
        .route("/metrics/summary", get(summary))
        .route("/pools/tvl", get(pools_tvl))
        .route("/pools/volume", get(pools_volume))
        .route("/pools/turnover", get(pools_turnover))
        .route("/pools/utilization", get(pools_utilization))
        .route("/traders", get(traders))
        .route("/dex/pools", get(dex_pools))
        .route("/stats", get(stats))
        .with_state(state);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
