//! # Reservation Manager
//!
//! Time-bounded holds on available stock. A reservation is `Active` while its row exists;
//! release, expiry and fulfilment each remove the row in the same atomic unit that
//! writes the ledger entry and updates the record.
//!
//! The transitions ([`reserve`], [`release`], [`fulfill`]) are pure functions over a
//! record. [`ReservationManager`] routes each one to the shard that owns the record, so
//! two reservations against one key can never both observe the same available quantity.

use crate::clients::InventoryClient;
use crate::error::InventoryError;
use crate::model::{
    InventoryMovement, InventoryRecord, MovementDraft, MovementKind, OrderId, Provenance,
    ReleaseCause, ReservationId, StockKey, StockReservation, SweepReport,
};
use crate::store::LedgerStore;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Reservations fetched per page during a sweep pass.
const SWEEP_BATCH: usize = 500;

/// Places a hold of `quantity` units for `order_id`.
pub fn reserve(
    record: &InventoryRecord,
    order_id: OrderId,
    quantity: u32,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<(InventoryRecord, StockReservation, MovementDraft), InventoryError> {
    if quantity == 0 {
        return Err(InventoryError::Validation(
            "reservation quantity must be positive".to_string(),
        ));
    }
    if ttl <= Duration::zero() {
        return Err(InventoryError::Validation(format!(
            "reservation ttl must be positive, got {}s",
            ttl.num_seconds()
        )));
    }
    let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
        InventoryError::Validation(format!(
            "reservation ttl of {}s is out of range",
            ttl.num_seconds()
        ))
    })?;
    let available = record.available_quantity();
    if quantity > available {
        return Err(InventoryError::InsufficientStock {
            key: record.key.to_string(),
            requested: quantity,
            available,
        });
    }

    let mut next = record.clone();
    next.reserved_quantity += quantity;
    next.updated_at = now;
    next.check_invariant()?;

    let reservation = StockReservation {
        id: ReservationId::new(),
        order_id,
        key: record.key,
        quantity,
        expires_at,
        created_at: now,
    };
    let draft = split_change(
        record,
        &next,
        MovementKind::Reserve,
        quantity,
        Provenance::Order(order_id),
        "reserved",
        &reservation,
        now,
    );
    Ok((next, reservation, draft))
}

/// Returns a reservation's units to available stock.
pub fn release(
    record: &InventoryRecord,
    reservation: &StockReservation,
    cause: ReleaseCause,
    now: DateTime<Utc>,
) -> Result<(InventoryRecord, MovementDraft), InventoryError> {
    let mut next = record.clone();
    next.reserved_quantity = record
        .reserved_quantity
        .checked_sub(reservation.quantity)
        .ok_or_else(|| {
            InventoryError::invariant(format!(
                "{}: releasing {} for {} but only {} reserved",
                record.key, reservation.quantity, reservation.id, record.reserved_quantity
            ))
        })?;
    next.updated_at = now;

    let draft = split_change(
        record,
        &next,
        MovementKind::Release,
        reservation.quantity,
        cause.provenance(reservation.order_id),
        cause.reason(),
        reservation,
        now,
    );
    Ok((next, draft))
}

/// Converts a reservation into a permanent `out` movement: quantity and reserved both
/// drop by the reserved amount, so available stock is unchanged.
pub fn fulfill(
    record: &InventoryRecord,
    reservation: &StockReservation,
    now: DateTime<Utc>,
) -> Result<(InventoryRecord, MovementDraft), InventoryError> {
    let (Some(reserved), Some(quantity)) = (
        record.reserved_quantity.checked_sub(reservation.quantity),
        record.quantity.checked_sub(reservation.quantity),
    ) else {
        return Err(InventoryError::invariant(format!(
            "{}: fulfilling {} for {} with quantity {} and reserved {}",
            record.key,
            reservation.quantity,
            reservation.id,
            record.quantity,
            record.reserved_quantity
        )));
    };

    let mut next = record.clone();
    next.quantity = quantity;
    next.reserved_quantity = reserved;
    next.updated_at = now;
    next.check_invariant()?;

    let draft = split_change(
        record,
        &next,
        MovementKind::Out,
        reservation.quantity,
        Provenance::Order(reservation.order_id),
        "fulfilled",
        reservation,
        now,
    );
    Ok((next, draft))
}

#[allow(clippy::too_many_arguments)]
fn split_change(
    before: &InventoryRecord,
    after: &InventoryRecord,
    kind: MovementKind,
    quantity: u32,
    provenance: Provenance,
    reason: &str,
    reservation: &StockReservation,
    now: DateTime<Utc>,
) -> MovementDraft {
    MovementDraft {
        key: before.key,
        kind,
        quantity,
        previous_quantity: before.quantity,
        new_quantity: after.quantity,
        previous_reserved: before.reserved_quantity,
        new_reserved: after.reserved_quantity,
        provenance,
        reason: reason.to_string(),
        notes: Some(reservation.id.to_string()),
        created_by: None,
        created_at: now,
    }
}

/// Creates, releases, fulfils and expires reservations.
#[derive(Clone)]
pub struct ReservationManager {
    records: InventoryClient,
    store: Arc<dyn LedgerStore>,
    default_ttl: Duration,
    sweep_batch: usize,
}

impl ReservationManager {
    pub fn new(records: InventoryClient, store: Arc<dyn LedgerStore>, default_ttl: Duration) -> Self {
        Self {
            records,
            store,
            default_ttl,
            sweep_batch: SWEEP_BATCH,
        }
    }

    /// Overrides the page size used by [`ReservationManager::sweep_expired_at`].
    pub fn with_sweep_batch(mut self, batch: usize) -> Self {
        self.sweep_batch = batch.max(1);
        self
    }

    /// Holds `quantity` units of `key` for `order_id`. `ttl` falls back to the configured
    /// default.
    pub async fn reserve(
        &self,
        order_id: OrderId,
        key: StockKey,
        quantity: u32,
        ttl: Option<Duration>,
    ) -> Result<StockReservation, InventoryError> {
        self.reserve_until(order_id, key, quantity, ttl, None).await
    }

    #[instrument(skip(self))]
    pub async fn reserve_until(
        &self,
        order_id: OrderId,
        key: StockKey,
        quantity: u32,
        ttl: Option<Duration>,
        deadline: Option<Instant>,
    ) -> Result<StockReservation, InventoryError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.records
            .reserve(key, order_id, quantity, ttl, deadline)
            .await
    }

    /// Releases one active reservation. Releasing it again fails with `NotFound`.
    #[instrument(skip(self))]
    pub async fn release(
        &self,
        reservation_id: ReservationId,
    ) -> Result<StockReservation, InventoryError> {
        let reservation = self.active(reservation_id).await?;
        self.records
            .release(reservation.key, reservation_id, ReleaseCause::Released)
            .await
    }

    /// Releases every active reservation of an order.
    ///
    /// Each reservation is attempted even if an earlier one fails; the first failure is
    /// returned and the reservations that failed stay active.
    #[instrument(skip(self))]
    pub async fn release_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StockReservation>, InventoryError> {
        let reservations = self.for_order(order_id).await?;
        let mut released = Vec::with_capacity(reservations.len());
        let mut first_error = None;
        for reservation in reservations {
            match self
                .records
                .release(reservation.key, reservation.id, ReleaseCause::Released)
                .await
            {
                Ok(reservation) => released.push(reservation),
                Err(e) => {
                    warn!(reservation_id = %reservation.id, error = %e, "Release failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(released),
        }
    }

    /// Turns every active reservation of an order into a permanent `out` movement.
    ///
    /// Same failure handling as [`ReservationManager::release_by_order`].
    #[instrument(skip(self))]
    pub async fn fulfill_by_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<InventoryMovement>, InventoryError> {
        let reservations = self.for_order(order_id).await?;
        let mut movements = Vec::with_capacity(reservations.len());
        let mut first_error = None;
        for reservation in reservations {
            match self.records.fulfill(reservation.key, reservation.id).await {
                Ok(movement) => movements.push(movement),
                Err(e) => {
                    warn!(reservation_id = %reservation.id, error = %e, "Fulfilment failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(movements),
        }
    }

    pub async fn reservations_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StockReservation>, InventoryError> {
        self.store.reservations_for_order(order_id).await
    }

    pub async fn sweep_expired(&self) -> Result<SweepReport, InventoryError> {
        self.sweep_expired_at(Utc::now()).await
    }

    /// Releases every reservation that expired before `now`.
    ///
    /// Reservations are released one at a time through their own shard, so the sweep
    /// never blocks traffic for other keys. A failure is recorded in the report and the
    /// reservation is picked up again by the next sweep. Pages advance by expiry cursor,
    /// so reservations that keep failing never hide the ones behind them.
    #[instrument(skip(self))]
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<SweepReport, InventoryError> {
        let mut report = SweepReport::default();
        let mut cursor = None;
        loop {
            let page = self
                .store
                .expired_reservations(now, cursor, self.sweep_batch)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some((last.expires_at, last.id));
            let full = page.len() == self.sweep_batch;

            for reservation in page {
                match self
                    .records
                    .release(reservation.key, reservation.id, ReleaseCause::Expired)
                    .await
                {
                    Ok(_) => report.released += 1,
                    Err(InventoryError::NotFound(_)) => {
                        debug!(reservation_id = %reservation.id, "Reservation already gone");
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!(reservation_id = %reservation.id, key = %reservation.key, error = %e, "Expiry release failed");
                        report.failed.push((reservation.id, e));
                    }
                }
            }

            if !full {
                break;
            }
        }
        if report.released > 0 || !report.failed.is_empty() {
            info!(
                released = report.released,
                skipped = report.skipped,
                failed = report.failed.len(),
                "Expiry sweep finished"
            );
        }
        Ok(report)
    }

    async fn active(&self, reservation_id: ReservationId) -> Result<StockReservation, InventoryError> {
        self.store
            .reservation(reservation_id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(reservation_id.to_string()))
    }

    async fn for_order(&self, order_id: OrderId) -> Result<Vec<StockReservation>, InventoryError> {
        let reservations = self.store.reservations_for_order(order_id).await?;
        if reservations.is_empty() {
            return Err(InventoryError::NotFound(format!(
                "no active reservations for {}",
                order_id
            )));
        }
        Ok(reservations)
    }
}
