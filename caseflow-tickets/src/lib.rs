//! caseflow-tickets library - support ticket service
//!
//! In-memory ticket store with secondary indexes, bulk import from CSV/JSON/XML and a
//! keyword classifier, served over HTTP.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::StatusCode, response::IntoResponse, Json, Router};
use caseflow_common::config::RunMode;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod models;
pub mod parsers;
pub mod services;
pub mod store;
pub mod validation;

pub use store::TicketStore;

/// Service name used in logs, health responses and config lookup
pub const SERVICE_NAME: &str = "caseflow-tickets";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Import documents arrive inline in JSON bodies
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Ticket store; each write handler holds the write guard for its whole operation
    pub store: Arc<RwLock<TicketStore>>,
    pub environment: RunMode,
    /// Server start time, for uptime
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: TicketStore, environment: RunMode) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            environment,
            started_at: Utc::now(),
        }
    }

    /// 500 error whose message is only shown in development mode
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
        .merge(api::ticket_routes())
        .merge(api::health_routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "The requested resource was not found"
        })),
    )
}
