use std::path::PathBuf;

use anyhow::Result;
use api::{router, AppState};
use clap::Parser;
use migration::{Migrator, MigratorTrait};
use shared::logging::init_tracing;
use shared::{get_db_connection, Config};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "api", about = "Candlestick store REST service")]
struct Args {
    /// A dotenv file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// A host where server is deployed
    #[arg(long, default_value = "localhost")]
    host: String,

    /// A port where server is deployed
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Log at DEBUG level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let _log_guard = init_tracing("api", args.debug, config.log_json, config.log_dir.as_deref())?;

    info!("Starting candlestick store API server...");
    match &args.config {
        Some(path) => info!("Loaded environment config {}", path.display()),
        None => warn!("Config is not provided. Read from existing envs"),
    }

    let db = get_db_connection(&config.database_url).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Database schema is up to date");

    let app = router(AppState::new(db));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
