//! Configuration resolution tests
//!
//! Tests that point XDG_CONFIG_HOME at a temp dir are marked #[serial] so they
//! do not race on the process environment.

use caseflow_common::config::{ConfigSource, Overrides, RunMode, ServiceConfig};
use caseflow_common::Error;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "tickets.toml",
        r#"
        host = "0.0.0.0"
        port = 4100
        environment = "development"

        [logging]
        level = "debug"

        [tickets]
        max_tickets = 50
        "#,
    );

    let config = ServiceConfig::resolve(
        "caseflow-tickets",
        3000,
        Overrides {
            config_path: Some(path.clone()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 4100);
    assert_eq!(config.environment, RunMode::Development);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.tickets.max_tickets, Some(50));
    assert_eq!(config.source, ConfigSource::File(path));
}

#[test]
fn cli_values_override_file_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "ledger.toml", "port = 4200\n[logging]\nlevel = \"warn\"\n");

    let config = ServiceConfig::resolve(
        "caseflow-ledger",
        3001,
        Overrides {
            config_path: Some(path),
            port: Some(5000),
            log_level: Some("trace".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.port, 5000);
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = ServiceConfig::resolve(
        "caseflow-tickets",
        3000,
        Overrides {
            config_path: Some(dir.path().join("absent.toml")),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn malformed_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.toml", "port = \"not a number\"\n");

    let result = ServiceConfig::resolve(
        "caseflow-tickets",
        3000,
        Overrides {
            config_path: Some(path),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn ledger_seed_file_is_read_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "ledger.toml",
        "[ledger]\nseed_file = \"demo/sample-data.json\"\n",
    );

    let config = ServiceConfig::resolve(
        "caseflow-ledger",
        3001,
        Overrides {
            config_path: Some(path),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(
        config.ledger.seed_file.as_deref(),
        Some(std::path::Path::new("demo/sample-data.json"))
    );
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn default_location_is_used_when_present() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("caseflow")).unwrap();
    fs::write(
        dir.path().join("caseflow").join("caseflow-tickets.toml"),
        "port = 4300\n",
    )
    .unwrap();

    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    let config = ServiceConfig::resolve("caseflow-tickets", 3000, Overrides::default());
    std::env::remove_var("XDG_CONFIG_HOME");

    let config = config.unwrap();
    assert_eq!(config.port, 4300);
    assert!(matches!(config.source, ConfigSource::File(_)));
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn absent_default_location_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    let config = ServiceConfig::resolve("caseflow-tickets", 3000, Overrides::default());
    std::env::remove_var("XDG_CONFIG_HOME");

    let config = config.unwrap();
    assert_eq!(config.port, 3000);
    assert!(matches!(config.source, ConfigSource::Defaults { .. }));
}
