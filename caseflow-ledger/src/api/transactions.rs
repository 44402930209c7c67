//! Transaction API handlers
//!
//! POST /transactions, GET /transactions, GET /transactions/export, GET /transactions/:id

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::DataResponse;
use crate::{
    error::{ApiError, ApiResult},
    export::to_csv,
    models::Transaction,
    validation::{validate_transaction, TransactionQuery, TransactionRequest},
    AppState,
};

/// GET /transactions/export query; filters as in GET /transactions
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    #[serde(flatten)]
    pub filters: TransactionQuery,
}

/// POST /transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<Transaction>>)> {
    let Json(request) = payload?;
    let new = validate_transaction(&request).map_err(ApiError::Validation)?;

    let transaction = state.store.write().await.create(new);

    info!(
        transaction_id = %transaction.id,
        tx_type = %transaction.tx_type,
        currency = %transaction.currency,
        "Transaction created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            transaction,
            "Transaction created successfully",
        )),
    ))
}

/// GET /transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<Vec<Transaction>>>> {
    let Query(query) = query?;
    let filters = query.into_filters().map_err(ApiError::Validation)?;

    let transactions = state.store.read().await.list(&filters);
    Ok(Json(DataResponse::new(transactions)))
}

/// GET /transactions/export
///
/// Only `format=csv` (the default) is supported.
pub async fn export_transactions(
    State(state): State<AppState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let format = query.format.as_deref().unwrap_or("csv");
    if !format.eq_ignore_ascii_case("csv") {
        return Err(ApiError::BadRequest(
            "Invalid format. Supported formats: csv".to_string(),
        ));
    }
    let filters = query.filters.into_filters().map_err(ApiError::Validation)?;

    let transactions = state.store.read().await.list(&filters);
    let body = to_csv(&transactions).map_err(|e| state.internal_error(e))?;

    info!(count = transactions.len(), "Exported transactions");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /transactions/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Transaction>>> {
    state
        .store
        .read()
        .await
        .find_by_id(&id)
        .cloned()
        .map(|t| Json(DataResponse::new(t)))
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))
}

/// Build transaction routes
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/export", get(export_transactions))
        .route("/transactions/:id", get(get_transaction))
}
