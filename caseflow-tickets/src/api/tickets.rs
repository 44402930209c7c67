//! Ticket API handlers
//!
//! POST /tickets, POST /tickets/import, GET /tickets, GET|PUT|DELETE /tickets/:id,
//! POST /tickets/:id/auto-classify

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use caseflow_common::api::FieldError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        ClassificationData, FileType, ImportResult, NewTicket, Ticket, TicketFilters, TicketPatch,
    },
    services::{classify, detect_file_type, Classification, Importer},
    validation::field_errors,
    AppState,
};

const MANUAL_OVERRIDE_REASON: &str = "Manually overridden via PUT /tickets/:id";

/// POST /tickets query
#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    #[serde(rename = "autoClassify")]
    pub auto_classify: Option<String>,
}

/// POST /tickets/import request
///
/// `content` and `autoClassify` stay loosely typed so a wrong JSON type gets the same
/// message as a missing value.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, rename = "fileType")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "autoClassify")]
    pub auto_classify: Option<Value>,
}

impl ImportRequest {
    /// `true` or `"true"`
    fn auto_classify(&self) -> bool {
        match &self.auto_classify {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text == "true",
            _ => false,
        }
    }
}

/// GET /tickets response
#[derive(Debug, Serialize)]
pub struct TicketList {
    pub count: usize,
    pub tickets: Vec<Ticket>,
}

/// POST /tickets/:id/auto-classify response
#[derive(Debug, Serialize)]
pub struct AutoClassifyResponse {
    pub ticket: Ticket,
    pub classification: Classification,
}

fn validate<T: Validate>(value: &T) -> ApiResult<()> {
    value
        .validate()
        .map_err(|errors| ApiError::Validation(field_errors(&errors)))
}

/// POST /tickets
///
/// With `?autoClassify=true` the classifier's category and priority replace the request's.
pub async fn create_ticket(
    State(state): State<AppState>,
    params: Result<Query<CreateParams>, QueryRejection>,
    payload: Result<Json<NewTicket>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let Query(params) = params?;
    let Json(mut new_ticket) = payload?;
    validate(&new_ticket)?;

    if params.auto_classify.as_deref() == Some("true") {
        let result = classify(&new_ticket.subject, &new_ticket.description);
        new_ticket.category = Some(result.category);
        new_ticket.priority = Some(result.priority);
        new_ticket.classification = Some(result.to_ticket_data());
    }

    let ticket = state
        .store
        .write()
        .await
        .create(new_ticket)
        .map_err(|e| state.internal_error(e))?;

    info!(
        ticket_id = %ticket.id,
        category = %ticket.category,
        priority = %ticket.priority,
        "Ticket created"
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// POST /tickets/import
///
/// 200 when nothing failed, 207 on partial success, 400 when every record failed.
pub async fn import_tickets(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ImportResult>)> {
    let Json(request) = payload?;
    let auto_classify = request.auto_classify();

    let content = match request.content {
        Some(Value::String(content)) if !content.is_empty() => content,
        _ => {
            return Err(ApiError::BadRequest(
                "Content is required and must be a string".to_string(),
            ))
        }
    };

    let file_type = match request.file_type.as_deref() {
        Some(requested) if !requested.is_empty() => requested.parse::<FileType>()?,
        _ => detect_file_type(&content, request.filename.as_deref()),
    };

    info!(%file_type, bytes = content.len(), auto_classify, "Import requested");

    // Parsing and classification run off the async workers and before the store lock
    let prepared = tokio::task::spawn_blocking(move || {
        Importer::new(file_type, auto_classify).prepare(&content)
    })
    .await
    .map_err(|e| state.internal_error(e))?;

    let result = prepared.commit(&mut *state.store.write().await);

    let status = if result.is_total_failure() {
        StatusCode::BAD_REQUEST
    } else if result.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((status, Json(result)))
}

/// GET /tickets
///
/// Oldest first.
pub async fn list_tickets(
    State(state): State<AppState>,
    filters: Result<Query<TicketFilters>, QueryRejection>,
) -> ApiResult<Json<TicketList>> {
    let Query(filters) = filters?;

    let mut tickets = state.store.read().await.find_by_filters(&filters);
    tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    debug!(?filters, count = tickets.len(), "Listed tickets");
    Ok(Json(TicketList {
        count: tickets.len(),
        tickets,
    }))
}

/// GET /tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Ticket>> {
    let Path(id) = path?;
    state
        .store
        .read()
        .await
        .find_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::ticket_not_found(&id))
}

/// PUT /tickets/:id
///
/// Setting category or priority marks the classification as a manual override.
pub async fn update_ticket(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<TicketPatch>, JsonRejection>,
) -> ApiResult<Json<Ticket>> {
    let Path(id) = path?;
    let Json(mut patch) = payload?;
    validate(&patch)?;
    if patch.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "body",
            "At least one field must be provided",
        )]));
    }

    let mut store = state.store.write().await;
    let existing = store
        .find_by_id(&id)
        .ok_or_else(|| ApiError::ticket_not_found(&id))?;

    if patch.overrides_classification() {
        let previous = existing.classification.clone().unwrap_or_default();
        patch.classification = Some(ClassificationData {
            confidence: previous.confidence,
            keywords: previous.keywords,
            reasoning: Some(MANUAL_OVERRIDE_REASON.to_string()),
            manually_classified: true,
        });
    }

    let ticket = store
        .update(&id, patch)
        .ok_or_else(|| ApiError::ticket_not_found(&id))?;

    info!(ticket_id = %ticket.id, status = %ticket.status, "Ticket updated");
    Ok(Json(ticket))
}

/// DELETE /tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    if !state.store.write().await.delete(&id) {
        return Err(ApiError::ticket_not_found(&id));
    }

    info!(ticket_id = %id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tickets/:id/auto-classify
pub async fn auto_classify_ticket(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<AutoClassifyResponse>> {
    let Path(id) = path?;
    let mut store = state.store.write().await;
    let existing = store
        .find_by_id(&id)
        .ok_or_else(|| ApiError::ticket_not_found(&id))?;

    let classification = classify(&existing.subject, &existing.description);
    let patch = TicketPatch::reclassify(
        classification.category,
        classification.priority,
        classification.to_ticket_data(),
    );
    let ticket = store
        .update(&id, patch)
        .ok_or_else(|| ApiError::ticket_not_found(&id))?;

    Ok(Json(AutoClassifyResponse {
        ticket,
        classification,
    }))
}

/// Build ticket routes
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket).get(list_tickets))
        .route("/tickets/import", post(import_tickets))
        .route(
            "/tickets/:id",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/tickets/:id/auto-classify", post(auto_classify_ticket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auto_classify_flag_accepts_bool_or_text() {
        let parse = |v: Value| serde_json::from_value::<ImportRequest>(v).unwrap().auto_classify();
        assert!(parse(json!({"autoClassify": true})));
        assert!(parse(json!({"autoClassify": "true"})));
        assert!(!parse(json!({"autoClassify": "yes"})));
        assert!(!parse(json!({"autoClassify": false})));
        assert!(!parse(json!({})));
    }
}
