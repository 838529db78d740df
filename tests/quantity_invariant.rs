//! Property tests over the pure stock transitions: any sequence of movements, holds,
//! releases and fulfilments keeps `available == quantity - reserved`, and every ledger row
//! chains onto the one before it.

use chrono::{Duration, Utc};
use inventory_ledger::ledger::apply_movement;
use inventory_ledger::model::{
    InventoryRecord, MovementDraft, MovementRequest, OrderId, ProductId, Provenance,
    ReleaseCause, StockChange, StockKey, StockReservation, Thresholds,
};
use inventory_ledger::reservations::{fulfill, release, reserve};
use inventory_ledger::InventoryError;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Move(StockChange, u32),
    Reserve(u32),
    Release(usize),
    Fulfill(usize),
}

fn op() -> impl Strategy<Value = Op> {
    let change = prop_oneof![
        Just(StockChange::In),
        Just(StockChange::Out),
        Just(StockChange::Adjustment),
        Just(StockChange::Transfer),
    ];
    prop_oneof![
        (change, 0u32..200).prop_map(|(change, quantity)| Op::Move(change, quantity)),
        (0u32..80).prop_map(Op::Reserve),
        any::<usize>().prop_map(Op::Release),
        any::<usize>().prop_map(Op::Fulfill),
    ]
}

/// Applies one op to the record, returning the ledger draft when the op succeeded.
fn step(
    record: &mut InventoryRecord,
    active: &mut Vec<StockReservation>,
    op: Op,
) -> Result<Option<MovementDraft>, InventoryError> {
    let now = Utc::now();
    match op {
        Op::Move(change, quantity) => {
            let request = MovementRequest::new(change, quantity, Provenance::Restock, "prop");
            let (next, draft) = apply_movement(record, &request, now)?;
            *record = next;
            Ok(Some(draft))
        }
        Op::Reserve(quantity) => {
            let (next, reservation, draft) =
                reserve(record, OrderId::new(), quantity, Duration::minutes(15), now)?;
            *record = next;
            active.push(reservation);
            Ok(Some(draft))
        }
        Op::Release(_) | Op::Fulfill(_) if active.is_empty() => Ok(None),
        Op::Release(pick) => {
            let reservation = active.remove(pick % active.len());
            let (next, draft) = release(record, &reservation, ReleaseCause::Released, now)?;
            *record = next;
            Ok(Some(draft))
        }
        Op::Fulfill(pick) => {
            let reservation = active.remove(pick % active.len());
            let (next, draft) = fulfill(record, &reservation, now)?;
            *record = next;
            Ok(Some(draft))
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: counters never break, whatever the sequence of requests.
    #[test]
    fn counters_stay_consistent(
        initial in 0u32..500,
        ops in prop::collection::vec(op(), 1..60)
    ) {
        let mut record = InventoryRecord::new(
            StockKey::product(ProductId::new()),
            initial,
            Thresholds::default(),
            Utc::now(),
        );
        let mut active: Vec<StockReservation> = Vec::new();

        for op in ops {
            let before = record.clone();
            match step(&mut record, &mut active, op) {
                Ok(Some(draft)) => {
                    prop_assert_eq!(draft.previous_quantity, before.quantity);
                    prop_assert_eq!(draft.previous_reserved, before.reserved_quantity);
                    prop_assert_eq!(draft.new_quantity, record.quantity);
                    prop_assert_eq!(draft.new_reserved, record.reserved_quantity);
                }
                Ok(None) => {
                    prop_assert_eq!(&record, &before);
                }
                Err(e) => {
                    // Rejected requests never touch the record
                    prop_assert_eq!(&record, &before);
                    prop_assert!(
                        !matches!(e, InventoryError::Store(_) | InventoryError::ActorCommunication(_)),
                        "unexpected error {:?}", e
                    );
                }
            }

            prop_assert!(record.check_invariant().is_ok());
            prop_assert!(record.counters().is_consistent());
            let held: u32 = active.iter().map(|r| r.quantity).sum();
            prop_assert_eq!(record.reserved_quantity, held);
        }
    }

    /// Property: a fulfilment removes units without changing what is available.
    #[test]
    fn fulfil_keeps_available(
        (quantity, hold) in (1u32..1000).prop_flat_map(|q| (Just(q), 1..=q))
    ) {
        let record = InventoryRecord::new(
            StockKey::product(ProductId::new()),
            quantity,
            Thresholds::default(),
            Utc::now(),
        );
        let now = Utc::now();
        let (held, reservation, _) =
            reserve(&record, OrderId::new(), hold, Duration::minutes(5), now).unwrap();
        let (done, draft) = fulfill(&held, &reservation, now).unwrap();

        prop_assert_eq!(done.available_quantity(), held.available_quantity());
        prop_assert_eq!(done.quantity, quantity - hold);
        prop_assert_eq!(done.reserved_quantity, 0);
        prop_assert_eq!(draft.quantity, hold);
    }
}
