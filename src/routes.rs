//! HTTP surface: the receipt API plus the operational endpoints.

use crate::error::ServiceError;
use crate::health::{self, HealthChecker};
use crate::metrics::RequestMetrics;
use crate::model::{PointsResponse, Receipt, ReceiptId, ReceiptIdResponse};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

const PROCESS_ENDPOINT: &str = "process_receipt";
const POINTS_ENDPOINT: &str = "get_points";

/// Assembles the full router: receipt routes with the configured body
/// limit, merged with health and metrics routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let health_checker = Arc::new(HealthChecker::new(state.clone()));

    let api = Router::new()
        .route("/receipts/process", post(process_receipt))
        .route("/receipts/{id}/points", get(get_points))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state);

    let ops = Router::new()
        .route("/health", get(health::liveness_handler))
        .route("/ready", get(health::readiness_handler))
        .route("/health/components", get(health::components_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(health_checker);

    api.merge(ops)
}

/// `POST /receipts/process`
///
/// Decoding goes through the rejection so a malformed body maps to the
/// canonical 400 instead of axum's default 422.
async fn process_receipt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Receipt>, JsonRejection>,
) -> Result<Json<ReceiptIdResponse>, ServiceError> {
    let guard = RequestMetrics::new(PROCESS_ENDPOINT);

    let result = match payload {
        Ok(Json(receipt)) => state.submit_receipt(receipt),
        Err(rejection) => Err(state.reject_malformed(rejection.body_text())),
    };

    match result {
        Ok(id) => {
            guard.success();
            info!(receipt_id = %id, "receipt processed");
            Ok(Json(ReceiptIdResponse { id }))
        }
        Err(err) => {
            guard.error(err.category());
            Err(err)
        }
    }
}

/// `GET /receipts/{id}/points`
async fn get_points(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, ServiceError> {
    let guard = RequestMetrics::new(POINTS_ENDPOINT);

    match state.points_for(&ReceiptId(id)) {
        Ok(points) => {
            guard.success();
            Ok(Json(PointsResponse { points }))
        }
        Err(err) => {
            guard.error(err.category());
            Err(err)
        }
    }
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> (axum::http::StatusCode, String) {
    let metrics_text = crate::metrics::METRICS.encode();
    (axum::http::StatusCode::OK, metrics_text)
}
