//! caseflow-ledger - transaction ledger service
//!
//! Serves transaction recording, listing, CSV export and balances over HTTP (default port 3001).

use std::path::PathBuf;

use anyhow::Result;
use caseflow_common::config::{ConfigSource, Overrides, RunMode, ServiceConfig};
use caseflow_common::logging::init_tracing;
use caseflow_common::shutdown::shutdown_signal;
use caseflow_ledger::seed::seed_from_file;
use caseflow_ledger::{build_router, AppState, TransactionStore, DEFAULT_PORT, SERVICE_NAME};
use clap::Parser;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "caseflow-ledger")]
#[command(about = "Transaction ledger with CSV export and account balances")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "CASEFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "CASEFLOW_HOST")]
    host: Option<String>,

    /// HTTP port
    #[arg(short, long, env = "CASEFLOW_PORT")]
    port: Option<u16>,

    /// development | production
    #[arg(long, env = "CASEFLOW_ENV")]
    environment: Option<RunMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// JSON file with sample transactions to load at startup (overrides config)
    #[arg(long)]
    seed_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let seed_override = args.seed_file.clone();
    let overrides = Overrides {
        config_path: args.config,
        host: args.host,
        port: args.port,
        environment: args.environment,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(SERVICE_NAME, DEFAULT_PORT, overrides)?;

    init_tracing(SERVICE_NAME, &config.logging);

    info!(
        "Starting {} v{} ({})",
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        config.environment
    );
    match &config.source {
        ConfigSource::File(path) => info!("Config loaded from {}", path.display()),
        ConfigSource::Defaults { searched } => warn!(
            searched = ?searched,
            "No config file found, using defaults"
        ),
    }

    let mut store = TransactionStore::new();
    if let Some(path) = seed_override.or(config.ledger.seed_file.clone()) {
        // Seeding is best effort
        if let Err(e) = seed_from_file(&mut store, &path) {
            warn!(path = %path.display(), error = %e, "Sample data not loaded");
        }
    }

    let state = AppState::new(store, config.environment);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("{} listening on http://{}", SERVICE_NAME, addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{} stopped", SERVICE_NAME);
    Ok(())
}
