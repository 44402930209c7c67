//! API body types shared by the caseflow HTTP services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One failed validation rule, addressed by field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// GET /health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Service name, e.g. "caseflow-tickets"
    pub service: String,
    /// Crate version of the serving binary
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the router state was built
    pub uptime_seconds: u64,
}

impl HealthResponse {
    pub fn ok(service: &str, version: &str, started_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            timestamp: now,
            uptime_seconds: now.signed_duration_since(started_at).num_seconds().max(0) as u64,
        }
    }
}
