//! # Store
//!
//! Durable tables behind the ledger: movements, reservations and alerts. Inventory
//! records themselves are owned by the actor shards.
//!
//! ## Atomicity
//!
//! [`LedgerStore::commit`] writes a movement row together with the reservation insert or
//! delete it belongs to, all or nothing. A shard calls it after computing the next record
//! and before replacing its own copy, so the ledger and the record never diverge.
//!
//! Components receive the store as an `Arc<dyn ...>` at construction, so tests can swap
//! in their own implementation.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::InventoryError;
use crate::model::{
    AlertDraft, AlertFilter, AlertId, InventoryAlert, InventoryMovement, MovementDraft, OrderId,
    ReservationId, StockKey, StockReservation,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One atomic ledger write.
#[derive(Debug, Clone)]
pub struct LedgerWrite {
    pub movement: MovementDraft,
    /// Reservation row to insert.
    pub reserve: Option<StockReservation>,
    /// Reservation row to delete. The commit fails with `NotFound` if it is gone.
    pub release: Option<ReservationId>,
}

impl LedgerWrite {
    pub fn movement(movement: MovementDraft) -> Self {
        Self {
            movement,
            reserve: None,
            release: None,
        }
    }

    pub fn reserving(movement: MovementDraft, reservation: StockReservation) -> Self {
        Self {
            movement,
            reserve: Some(reservation),
            release: None,
        }
    }

    pub fn releasing(movement: MovementDraft, reservation_id: ReservationId) -> Self {
        Self {
            movement,
            reserve: None,
            release: Some(reservation_id),
        }
    }
}

/// Position in expiry order: `(expires_at, id)` of the last reservation already seen.
pub type ExpiryCursor = (DateTime<Utc>, ReservationId);

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Applies the write atomically and returns the stored movement.
    async fn commit(&self, write: LedgerWrite) -> Result<InventoryMovement, InventoryError>;

    /// Movements of one key in sequence order, optionally only those at or after `since`.
    async fn movements(
        &self,
        key: &StockKey,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<InventoryMovement>, InventoryError>;

    async fn reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<StockReservation>, InventoryError>;

    async fn reservations_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StockReservation>, InventoryError>;

    async fn reservations_for_key(
        &self,
        key: &StockKey,
    ) -> Result<Vec<StockReservation>, InventoryError>;

    /// Active reservations with `expires_at < now`, oldest expiry first, starting after
    /// `after` when given.
    async fn expired_reservations(
        &self,
        now: DateTime<Utc>,
        after: Option<ExpiryCursor>,
        limit: usize,
    ) -> Result<Vec<StockReservation>, InventoryError>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Opens the alert unless one of the same type is already open for the key.
    ///
    /// Check and insert happen as one operation. Returns `None` when an open alert
    /// already existed.
    async fn open_alert_if_absent(
        &self,
        draft: AlertDraft,
    ) -> Result<Option<InventoryAlert>, InventoryError>;

    async fn open_alerts(&self, key: &StockKey) -> Result<Vec<InventoryAlert>, InventoryError>;

    /// Fails with `NotFound` or `AlreadyResolved`.
    async fn resolve_alert(
        &self,
        id: AlertId,
        at: DateTime<Utc>,
    ) -> Result<InventoryAlert, InventoryError>;

    /// Matching alerts, newest first.
    async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<InventoryAlert>, InventoryError>;
}
