//! Tests de middleware.

mod helpers;

use helpers::client;
use uuid::Uuid;

// === Request ID ===

#[tokio::test]
async fn response_includes_request_id() {
    let response = client().get("/health").await;

    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_is_uuid_v4() {
    let response = client().get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap();

    assert_eq!(parsed.get_version_num(), 4);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let custom_id = "edge-request-12345";

    let response = client()
        .get_with_headers("/health", vec![("x-request-id", custom_id)])
        .await;

    response.assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn oversized_request_id_is_replaced() {
    let long_id = "x".repeat(500);

    let response = client()
        .get_with_headers("/health", vec![("x-request-id", long_id.as_str())])
        .await;

    let id = response.header("x-request-id").unwrap();
    assert_ne!(id, long_id);
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let response1 = client().get("/health").await;
    let response2 = client().get("/health").await;

    let id1 = response1.header("x-request-id").unwrap();
    let id2 = response2.header("x-request-id").unwrap();

    assert_ne!(id1, id2);
}

#[tokio::test]
async fn request_id_present_on_not_found() {
    let response = client().get("/does-not-exist").await;

    response.assert_header_exists("x-request-id");
}
