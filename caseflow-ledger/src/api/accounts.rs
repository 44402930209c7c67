//! Account API handlers

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::DataResponse;
use crate::{models::AccountBalance, AppState};

/// GET /accounts/:accountId/balance
///
/// Unknown accounts are not an error: they report a zero balance.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Json<DataResponse<AccountBalance>> {
    let balance = state.store.read().await.balance(&account_id);
    Json(DataResponse::new(balance))
}

/// Build account routes
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/accounts/:account_id/balance", get(get_balance))
}
