use crate::config::ServerConfig;
use crate::error::ServiceError;
use crate::model::{Receipt, ReceiptId};
use crate::points::points_breakdown;
use crate::store::{MemoryReceiptStore, ReceiptStore};
use crate::validate::validate_receipt;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Shared service state: configuration, the receipt store, and operation
/// counters. Handlers stay thin; accepting, rejecting, and scoring all run
/// through here so counters, metrics, and logs move together.
pub struct AppState {
    config: Arc<ServerConfig>,
    store: Arc<dyn ReceiptStore>,
    /// Receipts accepted and stored
    submissions: AtomicU64,
    /// Submissions rejected (malformed body or failed validation)
    rejections: AtomicU64,
    /// Point lookups attempted
    lookups: AtomicU64,
    /// Point lookups for ids never issued
    lookup_misses: AtomicU64,
}

/// Counter snapshot surfaced through health checks.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub submissions: u64,
    pub rejections: u64,
    pub lookups: u64,
    pub lookup_misses: u64,
    pub stored: usize,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_store(config, Arc::new(MemoryReceiptStore::new()))
    }

    /// Builds state over a caller-supplied store.
    pub fn with_store(config: Arc<ServerConfig>, store: Arc<dyn ReceiptStore>) -> Self {
        Self {
            config,
            store,
            submissions: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
            lookup_misses: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn store(&self) -> &Arc<dyn ReceiptStore> {
        &self.store
    }

    /// Validates and stores a submitted receipt, returning its new id.
    pub fn submit_receipt(&self, receipt: Receipt) -> Result<ReceiptId, ServiceError> {
        if let Err(err) = validate_receipt(&receipt) {
            self.rejections.fetch_add(1, Ordering::Relaxed);
            return Err(err.into());
        }

        let id = self.store.append(receipt);
        self.submissions.fetch_add(1, Ordering::Relaxed);
        crate::metrics::METRICS.update_store_size(self.store.len());
        debug!(receipt_id = %id, stored = self.store.len(), "receipt accepted");
        Ok(id)
    }

    /// Looks up a stored receipt and computes its point total.
    pub fn points_for(&self, id: &ReceiptId) -> Result<u64, ServiceError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let Some(receipt) = self.store.lookup(id) else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
            return Err(ServiceError::ReceiptNotFound { id: id.clone() });
        };

        let breakdown = points_breakdown(&receipt);
        crate::metrics::METRICS.observe_points(breakdown.total);
        debug!(receipt_id = %id, points = breakdown.total, ?breakdown, "points computed");
        Ok(breakdown.total)
    }

    /// Registers a request body that never decoded into a receipt.
    pub fn reject_malformed(&self, detail: String) -> ServiceError {
        self.rejections.fetch_add(1, Ordering::Relaxed);
        ServiceError::MalformedJson { detail }
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            submissions: self.submissions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            stored: self.store.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use assert_matches::assert_matches;

    fn state() -> AppState {
        AppState::new(Arc::new(ServerConfig::default()))
    }

    fn receipt() -> Receipt {
        Receipt {
            retailer: "Target".to_string(),
            purchase_date: "2022-01-01".to_string(),
            purchase_time: "13:01".to_string(),
            items: vec![Item {
                short_description: "Gatorade".to_string(),
                price: "2.25".to_string(),
            }],
            total: "2.25".to_string(),
        }
    }

    #[test]
    fn submit_then_score_round_trips() {
        let state = state();
        let id = state.submit_receipt(receipt()).unwrap();
        // 6 retailer + 25 quarter + 6 odd day
        assert_eq!(state.points_for(&id).unwrap(), 37);

        let stats = state.stats();
        assert_eq!(stats.submissions, 1);
        assert_eq!(stats.lookups, 1);
        assert_eq!(stats.lookup_misses, 0);
        assert_eq!(stats.stored, 1);
    }

    #[test]
    fn invalid_submission_is_rejected_and_not_stored() {
        let state = state();
        let mut bad = receipt();
        bad.items.clear();

        assert_matches!(
            state.submit_receipt(bad),
            Err(ServiceError::InvalidReceipt(_))
        );
        let stats = state.stats();
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.stored, 0);
    }

    #[test]
    fn unknown_id_counts_as_a_lookup_miss() {
        let state = state();
        let missing = ReceiptId::generate();

        assert_matches!(
            state.points_for(&missing),
            Err(ServiceError::ReceiptNotFound { .. })
        );
        let stats = state.stats();
        assert_eq!(stats.lookups, 1);
        assert_eq!(stats.lookup_misses, 1);
    }

    #[test]
    fn malformed_bodies_count_as_rejections() {
        let state = state();
        let err = state.reject_malformed("expected value at line 1".to_string());
        assert_matches!(err, ServiceError::MalformedJson { .. });
        assert_eq!(state.stats().rejections, 1);
    }
}
