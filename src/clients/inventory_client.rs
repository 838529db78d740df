//! # Inventory Client
//!
//! Provides a high‑level API for interacting with the inventory shards.
//! It wraps a `ResourceClient<InventoryRecord>` and exposes domain‑specific methods.
use crate::error::InventoryError;
use crate::inventory_actor::{StockAction, StockActionResult};
use crate::model::{
    AlertEvaluation, InventoryCreate, InventoryFilter, InventoryMovement, InventoryRecord,
    InventorySummary, InventoryUpdate, MovementRequest, OrderId, Page, Paged, ProductId,
    ReleaseCause, ReservationId, StockKey, StockReservation,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use chrono::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Client for interacting with the inventory shards.
#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryRecord>,
}

#[async_trait]
impl ActorClient<InventoryRecord> for InventoryClient {
    type Error = InventoryError;

    fn inner(&self) -> &ResourceClient<InventoryRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        InventoryError::from(e)
    }
}

fn unexpected(expected: &str, got: &StockActionResult) -> InventoryError {
    InventoryError::ActorCommunication(format!(
        "{} action returned mismatched result {:?}",
        expected, got
    ))
}

impl InventoryClient {
    pub fn new(inner: ResourceClient<InventoryRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_inventory(
        &self,
        key: StockKey,
        params: InventoryCreate,
    ) -> Result<StockKey, InventoryError> {
        debug!("Sending request");
        self.inner.create(key, params).await.map_err(Self::map_error)
    }

    /// Changes thresholds. Quantities only change through movements and reservations.
    #[instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        key: StockKey,
        update: InventoryUpdate,
    ) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.inner.update(key, update).await.map_err(Self::map_error)
    }

    /// Records matching `filter`, sorted by key, one page at a time.
    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        filter: &InventoryFilter,
        page: Page,
    ) -> Result<Paged<InventoryRecord>, InventoryError> {
        let mut matching: Vec<InventoryRecord> = self
            .list()
            .await?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();
        matching.sort_by_key(|record| record.key);
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        Ok(Paged { items, total })
    }

    /// The product-level record and every variant record of a product.
    #[instrument(skip(self))]
    pub async fn get_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryRecord>, InventoryError> {
        let filter = InventoryFilter {
            product_id: Some(product_id),
            ..InventoryFilter::default()
        };
        let mut records: Vec<InventoryRecord> = self
            .list()
            .await?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by_key(|record| record.key);
        Ok(records)
    }

    /// Stock totals across all records. `open_alerts` is left at zero.
    pub async fn stock_summary(&self) -> Result<InventorySummary, InventoryError> {
        let records = self.list().await?;
        Ok(InventorySummary::from_records(&records))
    }

    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        key: StockKey,
        request: MovementRequest,
        deadline: Option<Instant>,
    ) -> Result<InventoryMovement, InventoryError> {
        match self
            .inner
            .perform_action_until(key, StockAction::RecordMovement(request), deadline)
            .await
            .map_err(Self::map_error)?
        {
            StockActionResult::RecordMovement(movement) => Ok(movement),
            other => Err(unexpected("RecordMovement", &other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        key: StockKey,
        order_id: OrderId,
        quantity: u32,
        ttl: Duration,
        deadline: Option<Instant>,
    ) -> Result<StockReservation, InventoryError> {
        debug!("Reserving {} units of {} for {}", quantity, key, order_id);
        let action = StockAction::Reserve {
            order_id,
            quantity,
            ttl,
        };
        match self
            .inner
            .perform_action_until(key, action, deadline)
            .await
            .map_err(Self::map_error)?
        {
            StockActionResult::Reserve(reservation) => Ok(reservation),
            other => Err(unexpected("Reserve", &other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn release(
        &self,
        key: StockKey,
        reservation_id: ReservationId,
        cause: ReleaseCause,
    ) -> Result<StockReservation, InventoryError> {
        let action = StockAction::Release {
            reservation_id,
            cause,
        };
        match self
            .inner
            .perform_action(key, action)
            .await
            .map_err(Self::map_error)?
        {
            StockActionResult::Release(reservation) => Ok(reservation),
            other => Err(unexpected("Release", &other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn fulfill(
        &self,
        key: StockKey,
        reservation_id: ReservationId,
    ) -> Result<InventoryMovement, InventoryError> {
        match self
            .inner
            .perform_action(key, StockAction::Fulfill { reservation_id })
            .await
            .map_err(Self::map_error)?
        {
            StockActionResult::Fulfill(movement) => Ok(movement),
            other => Err(unexpected("Fulfill", &other)),
        }
    }

    /// Re-evaluates alerts for `key` inside its shard, serialized with stock changes.
    #[instrument(skip(self))]
    pub async fn evaluate_alerts(&self, key: StockKey) -> Result<AlertEvaluation, InventoryError> {
        match self
            .inner
            .perform_action(key, StockAction::EvaluateAlerts)
            .await
            .map_err(Self::map_error)?
        {
            StockActionResult::EvaluateAlerts(evaluation) => Ok(evaluation),
            other => Err(unexpected("EvaluateAlerts", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provenance, StockChange, Thresholds};
    use actor_framework::mock::{create_mock_client, expect_action, MockClient};
    use chrono::Utc;

    fn key() -> StockKey {
        StockKey::product(ProductId::new())
    }

    #[tokio::test]
    async fn test_reserve_sends_reserve_action() {
        let (client, mut receiver) = create_mock_client::<InventoryRecord>(10);
        let inventory = InventoryClient::new(client);
        let key = key();
        let order_id = OrderId::new();

        let reserve_task = tokio::spawn(async move {
            inventory
                .reserve(key, order_id, 5, Duration::minutes(15), None)
                .await
        });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");

        assert_eq!(id, key);
        let StockAction::Reserve {
            order_id: sent_order,
            quantity,
            ttl,
        } = action
        else {
            panic!("expected Reserve action");
        };
        assert_eq!(sent_order, order_id);
        assert_eq!(quantity, 5);
        assert_eq!(ttl, Duration::minutes(15));

        let now = Utc::now();
        let reservation = StockReservation {
            id: ReservationId::new(),
            order_id,
            key,
            quantity,
            expires_at: now + ttl,
            created_at: now,
        };
        responder
            .send(Ok(StockActionResult::Reserve(reservation.clone())))
            .unwrap();

        let result = reserve_task.await.unwrap();
        assert_eq!(result.unwrap(), reservation);
    }

    #[tokio::test]
    async fn test_domain_error_survives_the_round_trip() {
        let mut mock = MockClient::<InventoryRecord>::new();
        let key = key();
        let insufficient = InventoryError::InsufficientStock {
            key: key.to_string(),
            requested: 30,
            available: 20,
        };
        mock.expect_action(key)
            .return_err(FrameworkError::EntityError(Box::new(insufficient.clone())));

        let inventory = InventoryClient::new(mock.client());
        let result = inventory
            .record_movement(
                key,
                MovementRequest::new(StockChange::Out, 30, Provenance::Restock, "sale"),
                None,
            )
            .await;

        assert_eq!(result, Err(insufficient));
        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatched_result_is_an_error() {
        let mut mock = MockClient::<InventoryRecord>::new();
        let key = key();
        mock.expect_action(key)
            .return_ok(StockActionResult::EvaluateAlerts(AlertEvaluation::default()));

        let inventory = InventoryClient::new(mock.client());
        let result = inventory.fulfill(key, ReservationId::new()).await;
        assert!(matches!(result, Err(InventoryError::ActorCommunication(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_list_records_filters_sorts_and_pages() {
        let mut mock = MockClient::<InventoryRecord>::new();
        let now = Utc::now();
        let mut records: Vec<InventoryRecord> = (0..5)
            .map(|i| {
                InventoryRecord::new(key(), i * 10, Thresholds::with_reorder_point(15), now)
            })
            .collect();
        mock.expect_list().return_ok(records.clone());

        let inventory = InventoryClient::new(mock.client());
        let low = InventoryFilter {
            low_stock_only: true,
            ..InventoryFilter::default()
        };
        let page = inventory
            .list_records(&low, Page { offset: 1, limit: 1 })
            .await
            .unwrap();

        // Quantities 0 and 10 are at or under the reorder point.
        records.retain(|r| r.quantity <= 15);
        records.sort_by_key(|r| r.key);
        assert_eq!(page.total, 2);
        assert_eq!(page.items, vec![records[1].clone()]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_deadline_exceeded_maps_to_domain() {
        let mut mock = MockClient::<InventoryRecord>::new();
        let key = key();
        mock.expect_action(key)
            .return_err(FrameworkError::DeadlineExceeded);

        let inventory = InventoryClient::new(mock.client());
        let result = inventory
            .record_movement(key, MovementRequest::restock(1), Some(Instant::now()))
            .await;
        assert_eq!(result, Err(InventoryError::DeadlineExceeded));
        mock.verify();
    }
}
