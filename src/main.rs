//! # Inventory Ledger Demo
//!
//! Walks one product through the life of a storefront order:
//! 1. Registering the product and creating its inventory record.
//! 2. Reserving stock at order time, then cancelling.
//! 3. Reserving again and fulfilling.
//! 4. Restocking a shipment through the bulk coordinator.

use inventory_ledger::bulk::BulkItem;
use inventory_ledger::catalog::InMemoryCatalog;
use inventory_ledger::config::LedgerConfig;
use inventory_ledger::lifecycle::{setup_tracing, InventorySystem};
use inventory_ledger::model::{
    AlertFilter, InventoryCreate, MovementRequest, OrderId, ProductId, StockKey, Thresholds,
    VariantId,
};
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = LedgerConfig::load()?;
    info!(?config, "Starting inventory ledger demo");

    let catalog = Arc::new(InMemoryCatalog::new());
    let product_id = ProductId::new();
    let variant_id = VariantId::new();
    catalog.register_variant(product_id, variant_id).await;

    let system = InventorySystem::in_memory(&config, catalog)?;
    let key = StockKey::variant(product_id, variant_id);

    system
        .inventory
        .create_inventory(
            key,
            InventoryCreate {
                initial_quantity: 100,
                thresholds: Thresholds::with_reorder_point(10),
            },
        )
        .await?;
    info!(%key, "Inventory created");

    let span = tracing::info_span!("cancelled_order");
    async {
        let order_a = OrderId::new();
        let reservation = system.reservations.reserve(order_a, key, 95, None).await?;
        info!(reservation_id = %reservation.id, "Reserved for order A");

        let open = system.alerts.list(&AlertFilter::open_for(key)).await?;
        info!(open_alerts = open.len(), "Alerts after reserving");

        system.reservations.release_by_order(order_a).await?;
        info!("Order A cancelled");
        Ok::<_, inventory_ledger::InventoryError>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("fulfilled_order");
    async {
        let order_b = OrderId::new();
        system.reservations.reserve(order_b, key, 30, None).await?;
        let movements = system.reservations.fulfill_by_order(order_b).await?;
        info!(movements = movements.len(), "Order B fulfilled");
        Ok::<_, inventory_ledger::InventoryError>(())
    }
    .instrument(span)
    .await?;

    let report = system
        .bulk
        .apply(vec![
            BulkItem::new(key, MovementRequest::restock(50).with_notes("shipment 42")),
            BulkItem::new(StockKey::product(ProductId::new()), MovementRequest::restock(5)),
        ])
        .await;
    info!(updated = report.updated, failed = report.failed.len(), "Shipment applied");

    let history = system.ledger.history(key, None).await?;
    for movement in &history {
        info!(
            id = %movement.id,
            kind = movement.kind.as_str(),
            quantity = movement.quantity,
            new_quantity = movement.new_quantity,
            reason = %movement.reason,
            reference_type = movement.provenance.reference_type(),
            "Ledger"
        );
    }

    let summary = system.summary().await?;
    info!(?summary, "Final summary");

    system.shutdown().await?;
    Ok(())
}
