//! Integration tests for POST /tickets/import
//!
//! Tests cover:
//! - CSV, JSON and XML documents end to end
//! - Status codes for full, partial and total failure
//! - File type selection (explicit, extension, content sniffing)
//! - Request-level rejections
//! - Capacity failures surfacing as row errors

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use caseflow_common::config::RunMode;
use caseflow_tickets::{build_router, AppState, TicketStore};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

const CSV_HEADER: &str =
    "customer_id,customer_email,customer_name,subject,description,category,priority,tags";

fn setup_app(store: TicketStore) -> Router {
    build_router(AppState::new(store, RunMode::Production))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, serde_json::from_slice(&bytes).expect("Should parse JSON"))
}

async fn ticket_count(app: &Router) -> u64 {
    let request = Request::builder()
        .uri("/tickets")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    body["count"].as_u64().unwrap()
}

#[tokio::test]
async fn test_csv_import_all_valid() {
    let app = setup_app(TicketStore::new());
    let content = format!(
        "{}\n\
         C1,a@example.com,Ann,Login,Cannot log in to the portal,account_access,high,\"vip,eu\"\n\
         C2,b@example.com,Bob,Invoice,Please resend last month's invoice,billing_question,low,\n",
        CSV_HEADER
    );

    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": content, "fileType": "CSV" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["successful"], 2);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["tickets"][0]["tags"], json!(["vip", "eu"]));
    assert_eq!(ticket_count(&app).await, 2);
}

#[tokio::test]
async fn test_header_only_csv_is_empty_success() {
    let app = setup_app(TicketStore::new());
    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": CSV_HEADER, "filename": "tickets.csv" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["successful"], 0);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn test_partial_json_import_is_multi_status() {
    let app = setup_app(TicketStore::new());
    let content = json!([
        {
            "customer_id": "C1", "customer_email": "a@example.com", "customer_name": "Ann",
            "subject": "Crash", "description": "The app crashes with an error on start"
        },
        {
            "customer_id": "C2", "customer_email": "b@example.com",
            "subject": "Missing name", "description": "This record has no customer name"
        }
    ])
    .to_string();

    let (status, body) = post_json(&app, "/tickets/import", json!({ "content": content })).await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["row"], 2);
    assert_eq!(body["errors"][0]["data"]["customer_id"], "C2");
    // missing category/priority were filled by the classifier
    assert_eq!(body["tickets"][0]["category"], "technical_issue");
    assert_eq!(
        body["tickets"][0]["classification"]["manually_classified"],
        false
    );
}

#[tokio::test]
async fn test_xml_import_detected_from_content() {
    let app = setup_app(TicketStore::new());
    let content = r#"<?xml version="1.0"?>
        <tickets>
          <ticket>
            <customer_id>C1</customer_id>
            <customer_email>a@example.com</customer_email>
            <customer_name>Ann</customer_name>
            <subject>Refund</subject>
            <description>I would like a refund for my subscription</description>
            <category>billing_question</category>
            <priority>medium</priority>
            <tags><tag>refund</tag></tags>
            <metadata><source>email</source></metadata>
          </ticket>
        </tickets>"#;

    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": content, "autoClassify": "true" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successful"], 1);
    let ticket = &body["tickets"][0];
    assert_eq!(ticket["category"], "billing_question");
    assert_eq!(ticket["metadata"]["source"], "email");
    assert_eq!(ticket["tags"], json!(["refund"]));
    assert!(ticket["classification"].is_object());
}

#[tokio::test]
async fn test_all_rows_failing_is_bad_request() {
    let app = setup_app(TicketStore::new());
    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": "{\"not\": \"an array\"}", "fileType": "json" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["successful"], 0);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["row"], 0);
    assert_eq!(ticket_count(&app).await, 0);
}

#[tokio::test]
async fn test_request_level_rejections() {
    let app = setup_app(TicketStore::new());

    let (status, body) = post_json(&app, "/tickets/import", json!({ "content": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content is required and must be a string");

    let (status, _) = post_json(&app, "/tickets/import", json!({ "content": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": "a,b", "fileType": "yaml" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid file type. Must be one of: csv, json, xml"
    );
}

#[tokio::test]
async fn test_capacity_failures_become_row_errors() {
    let app = setup_app(TicketStore::with_capacity_limit(Some(1)));
    let content = format!(
        "{}\n\
         C1,a@example.com,Ann,One,First long enough description,other,low,\n\
         C2,b@example.com,Bob,Two,Second long enough description,other,low,\n",
        CSV_HEADER
    );

    let (status, body) = post_json(
        &app,
        "/tickets/import",
        json!({ "content": content, "fileType": "csv" }),
    )
    .await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["row"], 2);
    assert_eq!(ticket_count(&app).await, 1);
}
