//! caseflow-tickets - support ticket service
//!
//! Serves ticket CRUD, bulk import and classification over HTTP (default port 3000).

use std::path::PathBuf;

use anyhow::Result;
use caseflow_common::config::{ConfigSource, Overrides, RunMode, ServiceConfig};
use caseflow_common::logging::init_tracing;
use caseflow_common::shutdown::shutdown_signal;
use caseflow_tickets::{build_router, AppState, TicketStore, DEFAULT_PORT, SERVICE_NAME};
use clap::Parser;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "caseflow-tickets")]
#[command(about = "Support ticket service with bulk import and auto-classification")]
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
}

impl From<Args> for Overrides {
    fn from(args: Args) -> Self {
        Overrides {
            config_path: args.config,
            host: args.host,
            port: args.port,
            environment: args.environment,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(SERVICE_NAME, DEFAULT_PORT, args.into())?;

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

    let store = TicketStore::with_capacity_limit(config.tickets.max_tickets);
    if let Some(limit) = config.tickets.max_tickets {
        info!(limit, "Ticket store capacity limited");
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
