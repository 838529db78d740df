//! Stock actions for the inventory actor.
//!
//! Every operation that changes a record's counters is an action, so it runs inside the
//! shard that owns the record. See
//! [`impl ActorEntity for InventoryRecord`](crate::model::InventoryRecord#impl-ActorEntity-for-InventoryRecord)
//! for how each one is applied.

use crate::model::{
    AlertEvaluation, InventoryMovement, MovementRequest, OrderId, ReleaseCause, ReservationId,
    StockReservation,
};
use chrono::Duration;

#[derive(Debug, Clone)]
pub enum StockAction {
    /// Applies an `in`/`out`/`adjustment`/`transfer` movement.
    RecordMovement(MovementRequest),
    /// Holds units for an order.
    ///
    /// # Errors
    /// `InsufficientStock` if `quantity` exceeds available stock.
    Reserve {
        order_id: OrderId,
        quantity: u32,
        ttl: Duration,
    },
    /// Returns a reservation's units to available stock.
    Release {
        reservation_id: ReservationId,
        cause: ReleaseCause,
    },
    /// Converts a reservation into a permanent `out` movement.
    Fulfill { reservation_id: ReservationId },
    /// Re-evaluates alerts against the current counters.
    EvaluateAlerts,
}

/// Results from StockActions - variants match 1:1 with StockAction
#[derive(Debug, Clone)]
pub enum StockActionResult {
    RecordMovement(InventoryMovement),
    Reserve(StockReservation),
    Release(StockReservation),
    Fulfill(InventoryMovement),
    EvaluateAlerts(AlertEvaluation),
}
