//! # caseflow common library
//!
//! Shared code for the caseflow services:
//! - Error type used by library layers
//! - Configuration loading (CLI / environment / TOML / defaults)
//! - Tracing subscriber setup
//! - API body types shared by both HTTP services
//! - Timestamp helpers
//! - Graceful shutdown signal

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;
pub mod time;

pub use error::{Error, Result};
