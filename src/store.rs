//! Receipt storage.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{Receipt, ReceiptId};

/// Append-and-lookup storage for validated receipts. Implementations must
/// be safe for concurrent use; a stored receipt is immutable and lives for
/// the process lifetime.
pub trait ReceiptStore: Send + Sync {
    /// Stores a validated receipt under a freshly minted id.
    fn append(&self, receipt: Receipt) -> ReceiptId;

    /// Fetches a receipt by id. `None` when the id was never issued.
    fn lookup(&self, id: &ReceiptId) -> Option<Arc<Receipt>>;

    /// Number of receipts currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store backing the service: a read-write-locked map from id to
/// receipt. The write lock publishes a fully-constructed `Arc<Receipt>`,
/// so a concurrent lookup sees either the whole receipt or nothing.
#[derive(Default)]
pub struct MemoryReceiptStore {
    receipts: RwLock<HashMap<ReceiptId, Arc<Receipt>>>,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReceiptStore for MemoryReceiptStore {
    fn append(&self, receipt: Receipt) -> ReceiptId {
        let id = ReceiptId::generate();
        self.receipts.write().insert(id.clone(), Arc::new(receipt));
        id
    }

    fn lookup(&self, id: &ReceiptId) -> Option<Arc<Receipt>> {
        self.receipts.read().get(id).cloned()
    }

    fn len(&self) -> usize {
        self.receipts.read().len()
    }
}
