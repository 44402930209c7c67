//! HTTP error type for the ticket service

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caseflow_common::api::FieldError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::ImportError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed field rules (400)
    #[error("Validation error: {0:?}")]
    Validation(Vec<FieldError>),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500). `expose` lets the message reach the client.
    #[error("Internal server error: {message}")]
    Internal { message: String, expose: bool },
}

impl ApiError {
    pub fn ticket_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Ticket with ID {} not found", id))
    }

    fn rejection(path: &str, message: String) -> Self {
        ApiError::Validation(vec![FieldError::new(path, message)])
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::rejection("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::rejection("query", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Validation error",
                    "details": details
                        .into_iter()
                        .map(|d| json!({ "message": d.message, "path": d.field }))
                        .collect::<Vec<_>>(),
                }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "status": StatusCode::BAD_REQUEST.as_u16() }),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": msg, "status": StatusCode::NOT_FOUND.as_u16() }),
            ),
            ApiError::Internal { message, expose } => {
                error!(error = %message, "Unexpected error");
                let message = if expose {
                    message
                } else {
                    "An unexpected error occurred".to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
