//! caseflow-ledger library - transaction ledger service
//!
//! Records deposits, withdrawals and transfers between `ACC-XXXXX` accounts, lists and
//! exports them, and reports per-account balances.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use caseflow_common::config::RunMode;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod export;
pub mod models;
pub mod seed;
pub mod store;
pub mod validation;

pub use store::TransactionStore;

/// Service name used in logs, health responses and config lookup
pub const SERVICE_NAME: &str = "caseflow-ledger";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3001;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<TransactionStore>>,
    pub environment: RunMode,
    /// Server start time, for uptime
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: TransactionStore, environment: RunMode) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            environment,
            started_at: Utc::now(),
        }
    }

    /// 500 error; the message is shown to clients only in development
    pub fn internal_error(&self, err: impl std::fmt::Display) -> error::ApiError {
        error::ApiError::Internal {
            message: err.to_string(),
            expose: self.environment.is_development(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::transaction_routes())
        .merge(api::account_routes())
        .merge(api::health_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
