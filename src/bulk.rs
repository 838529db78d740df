//! # Bulk Coordinator
//!
//! Applies a batch of movements with per-item isolation. Each item is its own atomic
//! unit; a failing item is reported and the rest of the batch carries on.

use crate::error::InventoryError;
use crate::ledger::MovementLedger;
use crate::model::{MovementRequest, StockKey};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct BulkItem {
    pub key: StockKey,
    pub request: MovementRequest,
}

impl BulkItem {
    pub fn new(key: StockKey, request: MovementRequest) -> Self {
        Self { key, request }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct BulkReport {
    pub updated: usize,
    pub failed: Vec<(StockKey, InventoryError)>,
}

#[derive(Clone)]
pub struct BulkCoordinator {
    ledger: MovementLedger,
}

impl BulkCoordinator {
    pub fn new(ledger: MovementLedger) -> Self {
        Self { ledger }
    }

    /// Applies items in input order, so several items for one key land deterministically.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn apply(&self, items: Vec<BulkItem>) -> BulkReport {
        let mut report = BulkReport::default();
        for item in items {
            match self.ledger.record_movement(item.key, item.request).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!(key = %item.key, error = %e, "Bulk item failed");
                    report.failed.push((item.key, e));
                }
            }
        }
        info!(
            updated = report.updated,
            failed = report.failed.len(),
            "Bulk apply finished"
        );
        report
    }
}
