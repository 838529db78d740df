use crate::model::{OrderId, StockKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A change to total quantity that a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChange {
    /// Adds units.
    In,
    /// Removes units.
    Out,
    /// Sets the total to an absolute value.
    Adjustment,
    /// Moves units out to another location.
    Transfer,
}

/// Ledger row type. `Reserve` and `Release` only move units between the available and
/// reserved split; total quantity is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
    Adjustment,
    Transfer,
    Reserve,
    Release,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Transfer => "transfer",
            MovementKind::Reserve => "reserve",
            MovementKind::Release => "release",
        }
    }
}

impl From<StockChange> for MovementKind {
    fn from(change: StockChange) -> Self {
        match change {
            StockChange::In => MovementKind::In,
            StockChange::Out => MovementKind::Out,
            StockChange::Adjustment => MovementKind::Adjustment,
            StockChange::Transfer => MovementKind::Transfer,
        }
    }
}

/// What caused a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "reference", rename_all = "snake_case")]
pub enum Provenance {
    Order(OrderId),
    Restock,
    ManualAdjustment { by: String },
    /// The expiry sweep released a reservation of this order.
    Sweep(OrderId),
}

impl Provenance {
    /// Flat reference value for the `reference` column.
    pub fn reference(&self) -> Option<String> {
        match self {
            Provenance::Order(order_id) | Provenance::Sweep(order_id) => Some(order_id.to_string()),
            Provenance::ManualAdjustment { by } => Some(by.clone()),
            Provenance::Restock => None,
        }
    }

    /// Flat value for the `reference_type` column.
    pub fn reference_type(&self) -> &'static str {
        match self {
            Provenance::Order(_) => "order",
            Provenance::Restock => "restock",
            Provenance::ManualAdjustment { .. } => "manual",
            Provenance::Sweep(_) => "sweep",
        }
    }
}

/// Opaque ledger sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovementId(pub u64);

impl Display for MovementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "movement_{}", self.0)
    }
}

/// A caller's request to change total quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementRequest {
    pub change: StockChange,
    /// Magnitude for `in`/`out`/`transfer`; the new absolute total for `adjustment`.
    pub quantity: u32,
    pub provenance: Provenance,
    pub reason: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

impl MovementRequest {
    pub fn new(
        change: StockChange,
        quantity: u32,
        provenance: Provenance,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            change,
            quantity,
            provenance,
            reason: reason.into(),
            notes: None,
            created_by: None,
        }
    }

    pub fn restock(quantity: u32) -> Self {
        Self::new(StockChange::In, quantity, Provenance::Restock, "restock")
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = Some(user.into());
        self
    }
}

/// A ledger row that has been computed but not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementDraft {
    pub key: StockKey,
    pub kind: MovementKind,
    pub quantity: u32,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub previous_reserved: u32,
    pub new_reserved: u32,
    pub provenance: Provenance,
    pub reason: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MovementDraft {
    pub fn into_movement(self, id: MovementId) -> InventoryMovement {
        InventoryMovement {
            id,
            key: self.key,
            kind: self.kind,
            quantity: self.quantity,
            previous_quantity: self.previous_quantity,
            new_quantity: self.new_quantity,
            previous_reserved: self.previous_reserved,
            new_reserved: self.new_reserved,
            provenance: self.provenance,
            reason: self.reason,
            notes: self.notes,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// An immutable ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: MovementId,
    pub key: StockKey,
    pub kind: MovementKind,
    pub quantity: u32,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub previous_reserved: u32,
    pub new_reserved: u32,
    pub provenance: Provenance,
    pub reason: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
