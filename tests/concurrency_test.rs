use actor_framework::ActorClient;
use inventory_ledger::catalog::InMemoryCatalog;
use inventory_ledger::config::LedgerConfig;
use inventory_ledger::lifecycle::InventorySystem;
use inventory_ledger::model::{
    InventoryCreate, MovementKind, MovementRequest, OrderId, ProductId, StockKey, Thresholds,
};
use inventory_ledger::InventoryError;
use std::sync::Arc;

async fn start(products: usize, quantity: u32) -> (InventorySystem, Vec<StockKey>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let mut keys = Vec::with_capacity(products);
    for _ in 0..products {
        let product_id = ProductId::new();
        catalog.register_product(product_id).await;
        keys.push(StockKey::product(product_id));
    }
    let config = LedgerConfig {
        shards: 4,
        ..LedgerConfig::default()
    };
    let system = InventorySystem::in_memory(&config, catalog).expect("Failed to start system");
    for key in &keys {
        system
            .inventory
            .create_inventory(
                *key,
                InventoryCreate {
                    initial_quantity: quantity,
                    thresholds: Thresholds::default(),
                },
            )
            .await
            .expect("Failed to create inventory");
    }
    (system, keys)
}

/// Two orders race for the last units; exactly one wins.
#[tokio::test]
async fn test_competing_reservations_never_oversubscribe() {
    let (system, keys) = start(1, 10).await;
    let key = keys[0];

    let first = system.reservations.clone();
    let second = system.reservations.clone();
    let (a, b) = tokio::join!(
        first.reserve(OrderId::new(), key, 8, None),
        second.reserve(OrderId::new(), key, 8, None),
    );
    drop(first);
    drop(second);

    let outcomes = [a, b];
    let won = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(won, 1, "Exactly one reservation should succeed");
    let lost = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        lost,
        InventoryError::InsufficientStock {
            requested: 8,
            available: 2,
            ..
        }
    ));

    let record = system.inventory.get(key).await.unwrap().unwrap();
    assert_eq!(record.reserved_quantity, 8);
    assert_eq!(record.available_quantity(), 2);

    system.shutdown().await.unwrap();
}

/// Many single-unit reservations against one key: successes never exceed stock.
#[tokio::test]
async fn test_reservation_storm_matches_stock() {
    let (system, keys) = start(1, 25).await;
    let key = keys[0];

    let mut handles = Vec::new();
    for _ in 0..60 {
        let reservations = system.reservations.clone();
        handles.push(tokio::spawn(async move {
            reservations.reserve(OrderId::new(), key, 1, None).await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(InventoryError::InsufficientStock { available: 0, .. }) => {}
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }
    assert_eq!(won, 25);

    let record = system.inventory.get(key).await.unwrap().unwrap();
    assert_eq!(record.reserved_quantity, 25);
    assert_eq!(record.available_quantity(), 0);

    let history = system.ledger.history(key, None).await.unwrap();
    let reserves = history
        .iter()
        .filter(|m| m.kind == MovementKind::Reserve)
        .count();
    assert_eq!(reserves, 25);

    system.shutdown().await.unwrap();
}

/// Mixed traffic across several keys keeps each record equal to its ledger.
#[tokio::test]
async fn test_concurrent_movements_across_keys() {
    let (system, keys) = start(8, 100).await;

    let mut handles = Vec::new();
    for (i, key) in keys.iter().copied().enumerate() {
        for round in 0..10 {
            let ledger = system.ledger.clone();
            let reservations = system.reservations.clone();
            handles.push(tokio::spawn(async move {
                if (i + round) % 2 == 0 {
                    ledger
                        .record_movement(key, MovementRequest::restock(3))
                        .await
                        .map(|_| ())
                } else {
                    reservations
                        .reserve(OrderId::new(), key, 2, None)
                        .await
                        .map(|_| ())
                }
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for key in &keys {
        let record = system.inventory.get(*key).await.unwrap().unwrap();
        let history = system.ledger.history(*key, None).await.unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.new_quantity, record.quantity);
        assert_eq!(last.new_reserved, record.reserved_quantity);
        assert_eq!(record.quantity, 115);
        assert_eq!(record.reserved_quantity, 10);
    }

    system.shutdown().await.unwrap();
}
