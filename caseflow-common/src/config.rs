//! Configuration loading for caseflow services
//!
//! Each value is resolved in this priority order:
//! 1. Command-line argument (or its environment variable fallback, handled by clap)
//! 2. TOML config file (explicit `--config` path, else `<config dir>/caseflow/<service>.toml`)
//! 3. Compiled default
//!
//! A missing config file is not an error: the service starts on defaults and logs a
//! warning once tracing is up. A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Runtime mode. Controls whether internal error messages reach HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn is_development(self) -> bool {
        self == RunMode::Development
    }
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => Err(Error::InvalidInput(format!(
                "unknown run mode '{}' (expected development or production)",
                other
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => f.write_str("development"),
            RunMode::Production => f.write_str("production"),
        }
    }
}

/// Bootstrap configuration as written in the TOML file
///
/// Every field is optional in the file; absent fields fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind (default 127.0.0.1)
    pub host: Option<String>,

    /// HTTP port (default depends on the service)
    pub port: Option<u16>,

    /// development | production
    pub environment: Option<RunMode>,

    pub logging: LoggingConfig,

    pub tickets: TicketSettings,

    pub ledger: LedgerSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Ticket service settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketSettings {
    /// Upper bound on stored tickets; unlimited when absent
    #[serde(default)]
    pub max_tickets: Option<usize>,
}

/// Ledger service settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerSettings {
    /// JSON file with `sampleTransactions` loaded at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

const DEFAULT_HOST: &str = "127.0.0.1";

/// Values supplied on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub environment: Option<RunMode>,
    pub log_level: Option<String>,
}

/// Where the TOML layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file found at the given default location
    Defaults { searched: Option<PathBuf> },
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service: String,
    pub host: String,
    pub port: u16,
    pub environment: RunMode,
    pub logging: LoggingConfig,
    pub tickets: TicketSettings,
    pub ledger: LedgerSettings,
    pub source: ConfigSource,
}

impl ServiceConfig {
    /// Resolve configuration for `service`, merging CLI overrides over the TOML file over defaults
    pub fn resolve(service: &str, default_port: u16, overrides: Overrides) -> Result<Self> {
        let (toml_config, source) = match &overrides.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                (load_toml(path)?, ConfigSource::File(path.clone()))
            }
            None => {
                let searched = default_config_path(service);
                match &searched {
                    Some(path) if path.exists() => {
                        (load_toml(path)?, ConfigSource::File(path.clone()))
                    }
                    _ => (TomlConfig::default(), ConfigSource::Defaults { searched }),
                }
            }
        };

        Ok(Self::merge(service, default_port, toml_config, overrides, source))
    }

    fn merge(
        service: &str,
        default_port: u16,
        toml_config: TomlConfig,
        overrides: Overrides,
        source: ConfigSource,
    ) -> Self {
        let mut logging = toml_config.logging;
        if let Some(level) = overrides.log_level {
            logging.level = level;
        }

        Self {
            service: service.to_string(),
            host: overrides
                .host
                .or(toml_config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml_config.port).unwrap_or(default_port),
            environment: overrides
                .environment
                .or(toml_config.environment)
                .unwrap_or_default(),
            logging,
            tickets: toml_config.tickets,
            ledger: toml_config.ledger,
            source,
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a TOML config file
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// `<platform config dir>/caseflow/<service>.toml`
pub fn default_config_path(service: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("caseflow").join(format!("{}.toml", service)))
}
