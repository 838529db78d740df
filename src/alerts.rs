//! # Alert Engine
//!
//! Keeps open alerts in line with a record's available quantity:
//!
//! | Condition                          | Alert opened   | Resolved once               |
//! |------------------------------------|----------------|-----------------------------|
//! | `available == 0`                   | `out_of_stock` | `available > 0`             |
//! | `0 < available <= reorder_point`   | `low_stock`    | `available > reorder_point` |
//!
//! Evaluation is idempotent: opening goes through
//! [`AlertStore::open_alert_if_absent`](crate::store::AlertStore::open_alert_if_absent),
//! so there is never more than one open alert per key and type.

use crate::error::InventoryError;
use crate::model::{
    AlertDraft, AlertEvaluation, AlertFilter, AlertId, AlertType, InventoryAlert, InventoryRecord,
    StockKey,
};
use crate::store::AlertStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct AlertEngine {
    store: Arc<dyn AlertStore>,
}

impl AlertEngine {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Opens the alert the record calls for and resolves alerts that no longer apply.
    #[instrument(skip_all, fields(key = %record.key, available = record.available_quantity()))]
    pub async fn evaluate(&self, record: &InventoryRecord) -> Result<AlertEvaluation, InventoryError> {
        let now = Utc::now();
        let available = record.available_quantity();
        let mut evaluation = AlertEvaluation::default();

        for alert in self.store.open_alerts(&record.key).await? {
            if !still_applies(alert.alert_type, record) {
                if let Some(resolved) = self.close(alert.id, now).await? {
                    info!(alert_id = %resolved.id, alert_type = resolved.alert_type.as_str(), "Alert resolved, stock recovered");
                    evaluation.resolved.push(resolved);
                }
            }
        }

        let wanted = if available == 0 {
            Some((AlertType::OutOfStock, 0))
        } else if record.is_low_stock() {
            Some((AlertType::LowStock, record.thresholds.reorder_point))
        } else {
            None
        };

        if let Some((alert_type, threshold_quantity)) = wanted {
            let draft = AlertDraft {
                key: record.key,
                alert_type,
                current_quantity: available,
                threshold_quantity,
                created_at: now,
            };
            if let Some(opened) = self.store.open_alert_if_absent(draft).await? {
                info!(alert_id = %opened.id, alert_type = alert_type.as_str(), "Alert opened");
                evaluation.opened.push(opened);
            }
        }

        Ok(evaluation)
    }

    /// Resolves an alert by hand.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: AlertId) -> Result<InventoryAlert, InventoryError> {
        let resolved = self.store.resolve_alert(id, Utc::now()).await?;
        info!(alert_id = %id, "Alert resolved");
        Ok(resolved)
    }

    /// Resolves every open alert of `key`. Used when the record itself goes away.
    #[instrument(skip(self))]
    pub async fn resolve_all(&self, key: StockKey) -> Result<Vec<InventoryAlert>, InventoryError> {
        let now = Utc::now();
        let mut resolved = Vec::new();
        for alert in self.store.open_alerts(&key).await? {
            if let Some(closed) = self.close(alert.id, now).await? {
                info!(alert_id = %closed.id, alert_type = closed.alert_type.as_str(), "Alert resolved, record removed");
                resolved.push(closed);
            }
        }
        Ok(resolved)
    }

    /// Alerts matching `filter`, newest first.
    pub async fn list(&self, filter: &AlertFilter) -> Result<Vec<InventoryAlert>, InventoryError> {
        self.store.alerts(filter).await
    }

    pub async fn open_count(&self) -> Result<usize, InventoryError> {
        let filter = AlertFilter {
            unresolved_only: true,
            ..AlertFilter::default()
        };
        Ok(self.store.alerts(&filter).await?.len())
    }

    /// Resolves one alert, treating an alert someone else already closed as done.
    async fn close(
        &self,
        id: AlertId,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryAlert>, InventoryError> {
        match self.store.resolve_alert(id, at).await {
            Ok(resolved) => Ok(Some(resolved)),
            Err(InventoryError::AlreadyResolved(_)) => {
                debug!(alert_id = %id, "Alert already resolved");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn still_applies(alert_type: AlertType, record: &InventoryRecord) -> bool {
    match alert_type {
        AlertType::OutOfStock => record.is_out_of_stock(),
        AlertType::LowStock | AlertType::ReorderPoint => record.is_low_stock(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductId, Thresholds};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Hands out open alerts, then closes them behind the caller's back, the way a
    /// concurrent manual resolve would.
    struct RacingResolveStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl AlertStore for RacingResolveStore {
        async fn open_alert_if_absent(
            &self,
            draft: AlertDraft,
        ) -> Result<Option<InventoryAlert>, InventoryError> {
            self.inner.open_alert_if_absent(draft).await
        }

        async fn open_alerts(&self, key: &StockKey) -> Result<Vec<InventoryAlert>, InventoryError> {
            let open = self.inner.open_alerts(key).await?;
            for alert in &open {
                self.inner.resolve_alert(alert.id, Utc::now()).await?;
            }
            Ok(open)
        }

        async fn resolve_alert(
            &self,
            id: AlertId,
            at: DateTime<Utc>,
        ) -> Result<InventoryAlert, InventoryError> {
            self.inner.resolve_alert(id, at).await
        }

        async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<InventoryAlert>, InventoryError> {
            self.inner.alerts(filter).await
        }
    }

    fn record(quantity: u32, reserved: u32) -> InventoryRecord {
        let mut record = InventoryRecord::new(
            StockKey::product(ProductId::new()),
            quantity,
            Thresholds::with_reorder_point(10),
            Utc::now(),
        );
        record.reserved_quantity = reserved;
        record
    }

    #[tokio::test]
    async fn test_low_stock_opens_once_and_resolves() {
        let engine = AlertEngine::new(Arc::new(MemoryStore::new()));
        let mut record = record(100, 95);

        let first = engine.evaluate(&record).await.unwrap();
        assert_eq!(first.opened.len(), 1);
        assert_eq!(first.opened[0].alert_type, AlertType::LowStock);
        assert_eq!(first.opened[0].current_quantity, 5);
        assert_eq!(first.opened[0].threshold_quantity, 10);

        let second = engine.evaluate(&record).await.unwrap();
        assert!(second.opened.is_empty());
        assert!(second.resolved.is_empty());

        record.reserved_quantity = 0;
        let recovered = engine.evaluate(&record).await.unwrap();
        assert_eq!(recovered.resolved.len(), 1);
        assert!(recovered.resolved[0].is_resolved);
        assert_eq!(engine.open_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_stock_resolves_when_available_returns() {
        let engine = AlertEngine::new(Arc::new(MemoryStore::new()));
        let mut record = record(10, 10);

        let evaluation = engine.evaluate(&record).await.unwrap();
        assert_eq!(evaluation.opened[0].alert_type, AlertType::OutOfStock);

        // Back above zero but still low: out_of_stock closes, low_stock opens.
        record.reserved_quantity = 7;
        let evaluation = engine.evaluate(&record).await.unwrap();
        assert_eq!(evaluation.resolved[0].alert_type, AlertType::OutOfStock);
        assert_eq!(evaluation.opened[0].alert_type, AlertType::LowStock);

        let open = engine
            .list(&AlertFilter::open_for(record.key))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].alert_type, AlertType::LowStock);
    }

    #[tokio::test]
    async fn test_manual_resolve() {
        let engine = AlertEngine::new(Arc::new(MemoryStore::new()));
        let evaluation = engine.evaluate(&record(0, 0)).await.unwrap();
        let id = evaluation.opened[0].id;

        engine.resolve(id).await.unwrap();
        assert!(matches!(
            engine.resolve(id).await,
            Err(InventoryError::AlreadyResolved(_))
        ));
        assert!(matches!(
            engine.resolve(AlertId::new()).await,
            Err(InventoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_resolve_does_not_abort_evaluation() {
        let engine = AlertEngine::new(Arc::new(RacingResolveStore {
            inner: MemoryStore::new(),
        }));
        let mut record = record(10, 10);
        let evaluation = engine.evaluate(&record).await.unwrap();
        assert_eq!(evaluation.opened[0].alert_type, AlertType::OutOfStock);

        // The stale out_of_stock alert is already closed when evaluation tries to resolve it
        record.reserved_quantity = 7;
        let evaluation = engine.evaluate(&record).await.unwrap();
        assert!(evaluation.resolved.is_empty());
        assert_eq!(evaluation.opened.len(), 1);
        assert_eq!(evaluation.opened[0].alert_type, AlertType::LowStock);
    }

    #[tokio::test]
    async fn test_resolve_all_closes_every_open_alert() {
        let engine = AlertEngine::new(Arc::new(MemoryStore::new()));
        let record = record(0, 0);
        engine.evaluate(&record).await.unwrap();
        assert_eq!(engine.open_count().await.unwrap(), 1);

        let resolved = engine.resolve_all(record.key).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(engine.open_count().await.unwrap(), 0);
        assert!(engine.resolve_all(record.key).await.unwrap().is_empty());
    }
}
