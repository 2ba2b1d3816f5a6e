use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dex_tracker::api::{create_rest_router, AppState};
use dex_tracker::config::{Config, DEFAULT_CONFIG_PATH};
use dex_tracker::services::{summary, MetricsDeriver};
use dex_tracker::sources::{JsonSnapshotSource, SnapshotSource};

#[derive(Parser)]
#[command(name = "dex-tracker", about = "Dashboard backend for DEX liquidity-pool snapshots")]
struct Cli {
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard API (default)
    Serve,
    /// Print the derived metrics once and exit
    Summary {
        /// Number of pools in the TVL ranking
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main(worker_threads = 4)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dex_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_from(&cli.config)?;
    tracing::info!("✓ Configuration loaded");

    let source = Arc::new(JsonSnapshotSource::from_config(&config.snapshot));
    for path in source.missing_files() {
        tracing::warn!("Snapshot file missing: {}", path.display());
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Summary { top } => {
            let snapshot = source.load().await?;
            if snapshot.tables.is_empty() {
                tracing::warn!("Snapshot holds no rows; every metric will be empty");
            }
            let limit = top.or(config.dashboard.top_pools_limit);
            let report = MetricsDeriver::new(&snapshot.tables).derive(limit);
            println!("{}", summary::render(&report));
        }
        Command::Serve => serve(&config, source).await?,
    }

    Ok(())
}

async fn serve(
    config: &Config,
    source: Arc<dyn SnapshotSource>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(source, config.dashboard.top_pools_limit));
    let app = create_rest_router(state, config.dashboard.static_dir.as_deref());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("✓ Dashboard API ready on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
