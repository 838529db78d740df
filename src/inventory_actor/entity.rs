//! ActorEntity implementation for [`InventoryRecord`].
//!
//! Every hook follows the same order: compute the next record, write to the store, then
//! replace `self`. The shard runs hooks on a draft and only keeps it on `Ok`, so a failed
//! store write leaves the record exactly as it was.

use super::actions::{StockAction, StockActionResult};
use crate::alerts::AlertEngine;
use crate::catalog::Catalog;
use crate::error::InventoryError;
use crate::ledger::apply_movement;
use crate::model::{
    InventoryCreate, InventoryRecord, InventoryUpdate, MovementDraft, MovementKind, Provenance,
    ReservationId, StockKey, StockReservation,
};
use crate::reservations;
use crate::store::{LedgerStore, LedgerWrite};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Dependencies injected into every inventory shard.
#[derive(Clone)]
pub struct InventoryContext {
    pub catalog: Arc<dyn Catalog>,
    pub ledger: Arc<dyn LedgerStore>,
    pub alerts: AlertEngine,
}

impl InventoryRecord {
    /// Alert evaluation after a committed change. Failures are logged and swallowed: the
    /// stock change has already happened.
    async fn evaluate_alerts_best_effort(&self, ctx: &InventoryContext) {
        if let Err(e) = ctx.alerts.evaluate(self).await {
            warn!(key = %self.key, error = %e, "Alert evaluation failed");
        }
    }

    async fn active_reservation(
        &self,
        ctx: &InventoryContext,
        reservation_id: ReservationId,
    ) -> Result<StockReservation, InventoryError> {
        ctx.ledger
            .reservation(reservation_id)
            .await?
            .filter(|reservation| reservation.key == self.key)
            .ok_or_else(|| InventoryError::NotFound(reservation_id.to_string()))
    }
}

#[async_trait]
impl ActorEntity for InventoryRecord {
    type Id = StockKey;
    type Create = InventoryCreate;
    type Update = InventoryUpdate;
    type Action = StockAction;
    type ActionResult = StockActionResult;
    type Context = InventoryContext;
    type Error = InventoryError;

    fn from_create_params(key: StockKey, params: InventoryCreate) -> Result<Self, Self::Error> {
        params.thresholds.validate()?;
        Ok(Self::new(
            key,
            params.initial_quantity,
            params.thresholds,
            Utc::now(),
        ))
    }

    /// Checks the catalog and records opening stock as an `in` movement.
    async fn on_create(&mut self, ctx: &Self::Context) -> Result<(), Self::Error> {
        if !ctx.catalog.product_exists(self.key.product_id).await {
            return Err(InventoryError::NotFound(self.key.product_id.to_string()));
        }
        if let Some(variant_id) = self.key.variant_id {
            if !ctx.catalog.variant_exists(variant_id).await {
                return Err(InventoryError::NotFound(variant_id.to_string()));
            }
        }

        if self.quantity > 0 {
            let draft = MovementDraft {
                key: self.key,
                kind: MovementKind::In,
                quantity: self.quantity,
                previous_quantity: 0,
                new_quantity: self.quantity,
                previous_reserved: 0,
                new_reserved: 0,
                provenance: Provenance::Restock,
                reason: "initial stock".to_string(),
                notes: None,
                created_by: None,
                created_at: self.created_at,
            };
            ctx.ledger.commit(LedgerWrite::movement(draft)).await?;
            self.last_restocked = Some(self.created_at);
        }

        self.evaluate_alerts_best_effort(ctx).await;
        Ok(())
    }

    /// Applies threshold changes. Caller-supplied counters are verified, never written.
    async fn on_update(
        &mut self,
        update: InventoryUpdate,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(counters) = update.counters {
            if !counters.is_consistent() {
                return Err(InventoryError::invariant(format!(
                    "{}: supplied counters {:?} are not self-consistent",
                    self.key, counters
                )));
            }
            if counters != self.counters() {
                return Err(InventoryError::invariant(format!(
                    "{}: supplied counters {:?} differ from stored {:?}",
                    self.key,
                    counters,
                    self.counters()
                )));
            }
        }

        if let Some(thresholds) = update.thresholds {
            thresholds.validate()?;
            self.thresholds = thresholds;
            self.updated_at = Utc::now();
            self.evaluate_alerts_best_effort(ctx).await;
        }
        Ok(())
    }

    /// Rejects the delete while any reservation still holds units of this record.
    /// Otherwise closes the record's open alerts, since nothing will evaluate them again.
    async fn on_delete(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        let open = ctx.ledger.reservations_for_key(&self.key).await?;
        if !open.is_empty() {
            return Err(InventoryError::HasOpenReservations {
                key: self.key.to_string(),
                open: open.len(),
            });
        }
        ctx.alerts.resolve_all(self.key).await?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: StockAction,
        ctx: &Self::Context,
    ) -> Result<StockActionResult, Self::Error> {
        let now = Utc::now();
        match action {
            StockAction::RecordMovement(request) => {
                let (next, draft) = apply_movement(self, &request, now)?;
                let movement = ctx.ledger.commit(LedgerWrite::movement(draft)).await?;
                *self = next;
                info!(key = %self.key, kind = movement.kind.as_str(), quantity = movement.quantity, new_quantity = self.quantity, "Movement recorded");
                self.evaluate_alerts_best_effort(ctx).await;
                Ok(StockActionResult::RecordMovement(movement))
            }
            StockAction::Reserve {
                order_id,
                quantity,
                ttl,
            } => {
                let (next, reservation, draft) =
                    reservations::reserve(self, order_id, quantity, ttl, now)?;
                ctx.ledger
                    .commit(LedgerWrite::reserving(draft, reservation.clone()))
                    .await?;
                *self = next;
                info!(key = %self.key, reservation_id = %reservation.id, %order_id, quantity, available = self.available_quantity(), "Stock reserved");
                self.evaluate_alerts_best_effort(ctx).await;
                Ok(StockActionResult::Reserve(reservation))
            }
            StockAction::Release {
                reservation_id,
                cause,
            } => {
                let reservation = self.active_reservation(ctx, reservation_id).await?;
                let (next, draft) = reservations::release(self, &reservation, cause, now)?;
                ctx.ledger
                    .commit(LedgerWrite::releasing(draft, reservation_id))
                    .await?;
                *self = next;
                info!(key = %self.key, %reservation_id, reason = cause.reason(), available = self.available_quantity(), "Reservation released");
                self.evaluate_alerts_best_effort(ctx).await;
                Ok(StockActionResult::Release(reservation))
            }
            StockAction::Fulfill { reservation_id } => {
                let reservation = self.active_reservation(ctx, reservation_id).await?;
                let (next, draft) = reservations::fulfill(self, &reservation, now)?;
                let movement = ctx
                    .ledger
                    .commit(LedgerWrite::releasing(draft, reservation_id))
                    .await?;
                *self = next;
                info!(key = %self.key, %reservation_id, quantity = reservation.quantity, "Reservation fulfilled");
                self.evaluate_alerts_best_effort(ctx).await;
                Ok(StockActionResult::Fulfill(movement))
            }
            StockAction::EvaluateAlerts => {
                let evaluation = ctx.alerts.evaluate(self).await?;
                Ok(StockActionResult::EvaluateAlerts(evaluation))
            }
        }
    }
}
