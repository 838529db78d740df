use crate::error::InventoryError;
use crate::model::{OrderId, Provenance, ReservationId, StockKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An active hold on available stock for one order.
///
/// Rows exist only while active. Release, expiry and fulfilment all delete the row; the
/// ledger entry written at the same time records which of them happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReservation {
    pub id: ReservationId,
    pub order_id: OrderId,
    pub key: StockKey,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Why a reservation is being released back to available stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseCause {
    /// Explicit release by the caller.
    Released,
    /// Released by the expiry sweep.
    Expired,
}

impl ReleaseCause {
    pub fn reason(&self) -> &'static str {
        match self {
            ReleaseCause::Released => "released",
            ReleaseCause::Expired => "expired",
        }
    }

    pub fn provenance(&self, order_id: OrderId) -> Provenance {
        match self {
            ReleaseCause::Released => Provenance::Order(order_id),
            ReleaseCause::Expired => Provenance::Sweep(order_id),
        }
    }
}

/// Outcome of one expiry sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub released: usize,
    /// Reservations already gone by the time the sweep reached them.
    pub skipped: usize,
    pub failed: Vec<(ReservationId, InventoryError)>,
}
