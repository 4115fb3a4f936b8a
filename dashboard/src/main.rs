use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::TimeDelta;
use clap::Parser;
use dashboard::services::{ChartService, PolygonClient};
use dashboard::{router, AppState};
use shared::logging::init_tracing;
use shared::{Config, StoreApiClient};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "dashboard", about = "Candlestick chart dashboard")]
struct Args {
    /// A dotenv file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// A host where server is deployed
    #[arg(long, default_value = "localhost")]
    host: String,

    /// A port where server is deployed
    #[arg(long, default_value_t = 8050)]
    port: u16,

    /// Log at DEBUG level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let _log_guard = init_tracing(
        "dashboard",
        args.debug,
        config.log_json,
        config.log_dir.as_deref(),
    )?;

    info!("Starting candlestick dashboard...");
    match &args.config {
        Some(path) => info!("Loaded environment config {}", path.display()),
        None => warn!("Config is not provided. Read from existing envs"),
    }

    let api_key = config.require_polygon_api_key()?;
    if config.tickers.is_empty() {
        warn!("TICKERS is empty; the dashboard has nothing to offer");
    }

    let store = StoreApiClient::new(config.backend_api_url.clone());
    info!("Using store service at {}", store.base_url);
    let provider = PolygonClient::new(config.polygon_base_url.clone(), api_key);

    let charts = ChartService::new(
        Arc::new(store),
        Arc::new(provider),
        config.polygon_batch_limit,
        TimeDelta::minutes(config.gap_warn_threshold_minutes),
    );
    let app = router(AppState::new(charts, config.tickers.clone()));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
