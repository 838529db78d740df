//! # Movement Ledger
//!
//! Every change to total quantity goes through [`MovementLedger::record_movement`]. The
//! request is routed to the shard that owns the record, which computes the next record
//! with [`apply_movement`], commits the ledger row, and only then replaces the record.

use crate::clients::InventoryClient;
use crate::error::InventoryError;
use crate::model::{
    InventoryMovement, InventoryRecord, MovementDraft, MovementKind, MovementRequest, StockChange,
    StockKey,
};
use crate::store::LedgerStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::instrument;

/// Computes the record after `request` and the ledger row describing it.
///
/// `out` and `transfer` larger than the total are `InsufficientStock`. Any change that
/// would leave the total below the reserved quantity (an `out` reaching into held units,
/// or an `adjustment` under the reserved count) is an invariant violation rather than a
/// clamp.
pub fn apply_movement(
    record: &InventoryRecord,
    request: &MovementRequest,
    now: DateTime<Utc>,
) -> Result<(InventoryRecord, MovementDraft), InventoryError> {
    if request.quantity == 0 && request.change != StockChange::Adjustment {
        return Err(InventoryError::Validation(format!(
            "{} movement needs a positive quantity",
            MovementKind::from(request.change).as_str()
        )));
    }

    let new_quantity = match request.change {
        StockChange::In => record.quantity.checked_add(request.quantity).ok_or_else(|| {
            InventoryError::Validation(format!(
                "{}: adding {} overflows quantity {}",
                record.key, request.quantity, record.quantity
            ))
        })?,
        StockChange::Out | StockChange::Transfer => {
            if request.quantity > record.quantity {
                return Err(InventoryError::InsufficientStock {
                    key: record.key.to_string(),
                    requested: request.quantity,
                    available: record.quantity,
                });
            }
            let remaining = record.quantity - request.quantity;
            if remaining < record.reserved_quantity {
                return Err(InventoryError::invariant(format!(
                    "{}: {} of {} leaves {} below reserved {}",
                    record.key,
                    MovementKind::from(request.change).as_str(),
                    request.quantity,
                    remaining,
                    record.reserved_quantity
                )));
            }
            remaining
        }
        StockChange::Adjustment => {
            if request.quantity < record.reserved_quantity {
                return Err(InventoryError::invariant(format!(
                    "{}: adjustment to {} is below reserved {}",
                    record.key, request.quantity, record.reserved_quantity
                )));
            }
            request.quantity
        }
    };

    let mut next = record.clone();
    next.quantity = new_quantity;
    next.updated_at = now;
    if request.change == StockChange::In {
        next.last_restocked = Some(now);
    }
    next.check_invariant()?;

    let draft = MovementDraft {
        key: record.key,
        kind: request.change.into(),
        quantity: request.quantity,
        previous_quantity: record.quantity,
        new_quantity,
        previous_reserved: record.reserved_quantity,
        new_reserved: next.reserved_quantity,
        provenance: request.provenance.clone(),
        reason: request.reason.clone(),
        notes: request.notes.clone(),
        created_by: request.created_by.clone(),
        created_at: now,
    };
    Ok((next, draft))
}

/// Entry point for quantity changes and ledger history.
#[derive(Clone)]
pub struct MovementLedger {
    records: InventoryClient,
    store: Arc<dyn LedgerStore>,
}

impl MovementLedger {
    pub fn new(records: InventoryClient, store: Arc<dyn LedgerStore>) -> Self {
        Self { records, store }
    }

    pub async fn record_movement(
        &self,
        key: StockKey,
        request: MovementRequest,
    ) -> Result<InventoryMovement, InventoryError> {
        self.record_movement_until(key, request, None).await
    }

    /// Records a movement that must start before `deadline`. A late request fails with
    /// `DeadlineExceeded` and changes nothing.
    #[instrument(skip(self))]
    pub async fn record_movement_until(
        &self,
        key: StockKey,
        request: MovementRequest,
        deadline: Option<Instant>,
    ) -> Result<InventoryMovement, InventoryError> {
        self.records.record_movement(key, request, deadline).await
    }

    /// Ledger rows for `key` in the order they were written.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        key: StockKey,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<InventoryMovement>, InventoryError> {
        self.store.movements(&key, since).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductId, Provenance, Thresholds};

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

    fn request(change: StockChange, quantity: u32) -> MovementRequest {
        MovementRequest::new(
            change,
            quantity,
            Provenance::ManualAdjustment {
                by: "tester".to_string(),
            },
            "count",
        )
    }

    #[test]
    fn test_in_adds_and_stamps_restock() {
        let before = record(20, 5);
        let now = Utc::now();
        let (after, draft) = apply_movement(&before, &request(StockChange::In, 7), now).unwrap();

        assert_eq!(after.quantity, 27);
        assert_eq!(after.reserved_quantity, 5);
        assert_eq!(after.last_restocked, Some(now));
        assert_eq!(draft.kind, MovementKind::In);
        assert_eq!((draft.previous_quantity, draft.new_quantity), (20, 27));
        assert_eq!((draft.previous_reserved, draft.new_reserved), (5, 5));
    }

    #[test]
    fn test_out_beyond_quantity_is_insufficient() {
        let before = record(20, 0);
        let result = apply_movement(&before, &request(StockChange::Out, 30), Utc::now());
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock {
                requested: 30,
                available: 20,
                ..
            })
        ));
    }

    #[test]
    fn test_out_into_reserved_units_is_violation() {
        let before = record(20, 15);
        let result = apply_movement(&before, &request(StockChange::Transfer, 6), Utc::now());
        assert!(matches!(result, Err(InventoryError::InvariantViolation(_))));

        let before_out = record(10, 5);
        let result = apply_movement(&before_out, &request(StockChange::Out, 6), Utc::now());
        assert!(matches!(result, Err(InventoryError::InvariantViolation(_))));

        // More than the total is still plain insufficient stock
        let result = apply_movement(&before_out, &request(StockChange::Out, 11), Utc::now());
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock {
                requested: 11,
                available: 10,
                ..
            })
        ));

        let (after, draft) =
            apply_movement(&before, &request(StockChange::Transfer, 5), Utc::now()).unwrap();
        assert_eq!(after.quantity, 15);
        assert_eq!(after.available_quantity(), 0);
        assert_eq!(draft.kind, MovementKind::Transfer);
    }

    #[test]
    fn test_adjustment_sets_absolute_value() {
        let before = record(20, 5);
        let (after, draft) =
            apply_movement(&before, &request(StockChange::Adjustment, 8), Utc::now()).unwrap();
        assert_eq!(after.quantity, 8);
        assert_eq!(after.available_quantity(), 3);
        assert_eq!(draft.quantity, 8);
        assert!(after.last_restocked.is_none());
    }

    #[test]
    fn test_adjustment_below_reserved_is_violation() {
        let before = record(20, 5);
        let result = apply_movement(&before, &request(StockChange::Adjustment, 4), Utc::now());
        assert!(matches!(result, Err(InventoryError::InvariantViolation(_))));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let before = record(20, 0);
        for change in [StockChange::In, StockChange::Out, StockChange::Transfer] {
            let result = apply_movement(&before, &request(change, 0), Utc::now());
            assert!(matches!(result, Err(InventoryError::Validation(_))));
        }
        let (after, _) =
            apply_movement(&before, &request(StockChange::Adjustment, 0), Utc::now()).unwrap();
        assert_eq!(after.quantity, 0);
    }
}
