//! Prometheus metrics for the receipt service.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Instant;

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// Labels for request metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Endpoint name ("process_receipt", "get_points")
    pub endpoint: String,
    /// Request status ("success", "error")
    pub status: String,
}

/// Labels for per-endpoint metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EndpointLabels {
    pub endpoint: String,
}

/// Labels for rejection metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RejectionLabels {
    /// Rejection class ("malformed_json", "validation_error", "not_found")
    pub category: String,
}

/// Central metrics collector with Prometheus registry
pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Total requests by endpoint and status
    pub receipt_requests_total: Family<RequestLabels, Counter>,

    /// Request duration in seconds by endpoint
    pub receipt_request_duration_seconds: Family<EndpointLabels, Histogram>,

    /// Requests currently in flight by endpoint
    pub receipt_active_requests: Family<EndpointLabels, Gauge>,

    /// Rejected requests by rejection class
    pub receipts_rejected_total: Family<RejectionLabels, Counter>,

    /// Receipts currently held in the store
    pub receipts_stored: Gauge,

    /// Distribution of point totals handed out
    pub receipt_points_awarded: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let receipt_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "receipt_requests_total",
            "Total number of receipt API requests",
            receipt_requests_total.clone(),
        );

        let receipt_request_duration_seconds =
            Family::<EndpointLabels, Histogram>::new_with_constructor(|| {
                // Buckets: 1ms, 2.5ms, 6.25ms, ... ~3.8s
                Histogram::new(exponential_buckets(0.001, 2.5, 10))
            });
        registry.register(
            "receipt_request_duration_seconds",
            "Request latency histogram in seconds",
            receipt_request_duration_seconds.clone(),
        );

        let receipt_active_requests = Family::<EndpointLabels, Gauge>::default();
        registry.register(
            "receipt_active_requests",
            "Number of requests currently being processed",
            receipt_active_requests.clone(),
        );

        let receipts_rejected_total = Family::<RejectionLabels, Counter>::default();
        registry.register(
            "receipts_rejected_total",
            "Total number of rejected requests by class",
            receipts_rejected_total.clone(),
        );

        let receipts_stored = Gauge::default();
        registry.register(
            "receipts_stored",
            "Number of receipts held in the store",
            receipts_stored.clone(),
        );

        // Point totals are small integers; power-of-two buckets up to 512
        // cover every realistic receipt.
        let receipt_points_awarded = Histogram::new(exponential_buckets(1.0, 2.0, 10));
        registry.register(
            "receipt_points_awarded",
            "Distribution of point totals computed for stored receipts",
            receipt_points_awarded.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            receipt_requests_total,
            receipt_request_duration_seconds,
            receipt_active_requests,
            receipts_rejected_total,
            receipts_stored,
            receipt_points_awarded,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        encode(&mut buffer, &registry).expect("encoding metrics should succeed");
        buffer
    }

    pub fn record_request_success(&self, endpoint: &str, duration: std::time::Duration) {
        self.receipt_requests_total
            .get_or_create(&RequestLabels {
                endpoint: endpoint.to_string(),
                status: "success".to_string(),
            })
            .inc();

        self.receipt_request_duration_seconds
            .get_or_create(&EndpointLabels {
                endpoint: endpoint.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    pub fn record_request_error(
        &self,
        endpoint: &str,
        duration: std::time::Duration,
        category: &str,
    ) {
        self.receipt_requests_total
            .get_or_create(&RequestLabels {
                endpoint: endpoint.to_string(),
                status: "error".to_string(),
            })
            .inc();

        self.receipt_request_duration_seconds
            .get_or_create(&EndpointLabels {
                endpoint: endpoint.to_string(),
            })
            .observe(duration.as_secs_f64());

        self.receipts_rejected_total
            .get_or_create(&RejectionLabels {
                category: category.to_string(),
            })
            .inc();
    }

    /// Update the stored-receipts gauge after an append.
    pub fn update_store_size(&self, size: usize) {
        self.receipts_stored.set(size as i64);
    }

    /// Record a computed point total.
    pub fn observe_points(&self, points: u64) {
        self.receipt_points_awarded.observe(points as f64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for automatic request timing and metric recording
///
/// Call `success()` or `error(category)` to settle the request; a guard
/// dropped without either is recorded as an error.
pub struct RequestMetrics {
    endpoint: String,
    start: Instant,
    completed: bool,
}

impl RequestMetrics {
    /// Increments the active-requests gauge and starts timing.
    pub fn new(endpoint: &str) -> Self {
        METRICS
            .receipt_active_requests
            .get_or_create(&EndpointLabels {
                endpoint: endpoint.to_string(),
            })
            .inc();

        Self {
            endpoint: endpoint.to_string(),
            start: Instant::now(),
            completed: false,
        }
    }

    pub fn success(mut self) {
        let duration = self.start.elapsed();
        METRICS.record_request_success(&self.endpoint, duration);
        self.completed = true;

        METRICS
            .receipt_active_requests
            .get_or_create(&EndpointLabels {
                endpoint: self.endpoint.clone(),
            })
            .dec();
    }

    pub fn error(mut self, category: &str) {
        let duration = self.start.elapsed();
        METRICS.record_request_error(&self.endpoint, duration, category);
        self.completed = true;

        METRICS
            .receipt_active_requests
            .get_or_create(&EndpointLabels {
                endpoint: self.endpoint.clone(),
            })
            .dec();
    }
}

impl Drop for RequestMetrics {
    fn drop(&mut self) {
        if !self.completed {
            let duration = self.start.elapsed();
            METRICS.record_request_error(&self.endpoint, duration, "unknown");

            METRICS
                .receipt_active_requests
                .get_or_create(&EndpointLabels {
                    endpoint: self.endpoint.clone(),
                })
                .dec();
        }
    }
}
