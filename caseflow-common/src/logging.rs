//! Tracing subscriber initialization shared by the service binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the service crate,
/// the common crate and `tower_http` request tracing.
pub fn init_tracing(service: &str, logging: &LoggingConfig) {
    let crate_target = service.replace('-', "_");
    let default_filter = format!(
        "{crate_target}={level},caseflow_common={level},tower_http={level}",
        level = logging.level
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
