//! HTTP API handlers for caseflow-ledger

pub mod accounts;
pub mod health;
pub mod transactions;

pub use accounts::account_routes;
pub use health::health_routes;
pub use transactions::transaction_routes;

use serde::Serialize;

/// Success envelope: `{ data, message? }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}
