//! Tests del endpoint de health.

mod helpers;

use axum::http::StatusCode;
use helpers::client;
use serde_json::Value;

#[tokio::test]
async fn health_returns_200() {
    client().get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn health_reports_up() {
    let body: Value = client().get("/health").await.json();

    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn health_is_json() {
    let response = client().get("/health").await;

    let content_type = response.header("content-type").unwrap();
    assert!(content_type.contains("application/json"));
}
