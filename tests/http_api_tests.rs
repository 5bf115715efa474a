//! HTTP round trips against the assembled router.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use receipt_points::{AppState, ServerConfig, build_router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const TARGET: &str = include_str!("../fixtures/receipts/target.json");
const CORNER_MARKET: &str = include_str!("../fixtures/receipts/corner-market.json");

fn router() -> Router {
    let state = Arc::new(AppState::new(Arc::new(ServerConfig::default())));
    build_router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router handles request");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec();
    (status, body)
}

async fn post_receipt(router: &Router, json: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/receipts/process")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .expect("build request");
    send(router, request).await
}

async fn get_points(router: &Router, id: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(format!("/receipts/{id}/points"))
        .body(Body::empty())
        .expect("build request");
    send(router, request).await
}

#[tokio::test]
async fn process_then_points_round_trip() {
    let router = router();

    for (json, expected) in [(TARGET, 28), (CORNER_MARKET, 109)] {
        let (status, body) = post_receipt(&router, json).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).expect("id response is JSON");
        let id = body["id"].as_str().expect("id is a string").to_string();
        assert!(!id.is_empty());

        let (status, body) = get_points(&router, &id).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).expect("points response is JSON");
        assert_eq!(body["points"].as_u64(), Some(expected));
    }
}

#[tokio::test]
async fn identical_submissions_get_distinct_ids() {
    let router = router();

    let (_, first) = post_receipt(&router, TARGET).await;
    let (_, second) = post_receipt(&router, TARGET).await;
    let first: Value = serde_json::from_slice(&first).unwrap();
    let second: Value = serde_json::from_slice(&second).unwrap();
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn malformed_json_is_a_400_with_the_canonical_body() {
    let router = router();

    let (status, body) = post_receipt(&router, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8_lossy(&body), "The receipt is invalid.");
}

#[tokio::test]
async fn invalid_receipt_is_a_400_with_the_canonical_body() {
    let router = router();
    let no_items = r#"{
        "retailer": "Target",
        "purchaseDate": "2022-01-01",
        "purchaseTime": "13:01",
        "items": [],
        "total": "35.35"
    }"#;

    let (status, body) = post_receipt(&router, no_items).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8_lossy(&body), "The receipt is invalid.");
}

#[tokio::test]
async fn missing_fields_are_a_400() {
    let router = router();

    let (status, _) = post_receipt(&router, r#"{"retailer": "Target"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_id_is_a_404_with_the_canonical_body() {
    let router = router();

    let (status, body) = get_points(&router, "no-such-receipt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        String::from_utf8_lossy(&body),
        "No receipt found for that ID."
    );
}

#[tokio::test]
async fn rejected_receipts_are_never_stored() {
    let state = Arc::new(AppState::new(Arc::new(ServerConfig::default())));
    let router = build_router(state.clone());

    let (status, _) = post_receipt(&router, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.stats().stored, 0);
    assert_eq!(state.stats().rejections, 1);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let config = ServerConfig {
        max_body_bytes: 1024,
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::new(Arc::new(config)));
    let router = build_router(state);

    let padded = format!(
        r#"{{
            "retailer": "{}",
            "purchaseDate": "2022-01-01",
            "purchaseTime": "13:01",
            "items": [{{"shortDescription": "Gatorade", "price": "2.25"}}],
            "total": "2.25"
        }}"#,
        "A".repeat(2048)
    );

    let (status, _) = post_receipt(&router, &padded).await;
    assert_ne!(status, StatusCode::OK);
}

#[tokio::test]
async fn liveness_endpoint_reports_healthy() {
    let router = router();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_number());
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn readiness_endpoint_reports_ready() {
    let router = router();

    let request = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn components_endpoint_reports_store_counters() {
    let router = router();
    post_receipt(&router, TARGET).await;

    let request = Request::builder()
        .uri("/health/components")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    let store = &json["components"]["store"];
    assert_eq!(store["status"], "healthy");
    assert_eq!(store["details"]["submissions"].as_u64(), Some(1));
    assert_eq!(store["details"]["stored"].as_u64(), Some(1));
}

#[tokio::test]
async fn metrics_endpoint_exposes_request_counters() {
    let router = router();
    post_receipt(&router, TARGET).await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("receipt_requests_total"));
    assert!(text.contains("receipts_stored"));
}
