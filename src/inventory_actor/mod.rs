//! # Inventory Actor
//!
//! The Inventory Record Store. Records are owned by [`ResourceActor`] shards; a record's
//! key always routes to the same shard, which applies movements, reservations and alert
//! evaluations for that key one at a time.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for
//!   [`InventoryRecord`] and the [`InventoryContext`] injected into each shard
//! - [`actions`] - [`StockAction`] and [`StockActionResult`]
//! - [`new()`] - Factory function that creates the shards and their client
//!
//! ## Usage
//!
//! ```rust
//! use inventory_ledger::alerts::AlertEngine;
//! use inventory_ledger::catalog::InMemoryCatalog;
//! use inventory_ledger::clients::InventoryClient;
//! use inventory_ledger::inventory_actor::{self, InventoryContext};
//! use inventory_ledger::model::{InventoryCreate, ProductId, StockKey, Thresholds};
//! use inventory_ledger::store::MemoryStore;
//! use actor_framework::spawn_all;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(InMemoryCatalog::new());
//!     let product_id = ProductId::new();
//!     catalog.register_product(product_id).await;
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let context = InventoryContext {
//!         catalog,
//!         ledger: store.clone(),
//!         alerts: AlertEngine::new(store),
//!     };
//!
//!     let (shards, generic_client) = inventory_actor::new(4, 32);
//!     let _handles = spawn_all(shards, context);
//!     let client = InventoryClient::new(generic_client);
//!
//!     let key = StockKey::product(product_id);
//!     client
//!         .create_inventory(key, InventoryCreate {
//!             initial_quantity: 100,
//!             thresholds: Thresholds::with_reorder_point(10),
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;

pub use actions::*;
pub use entity::*;

use crate::model::InventoryRecord;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates the inventory shards and the client that routes across them.
pub fn new(
    shards: usize,
    mailbox_capacity: usize,
) -> (Vec<ResourceActor<InventoryRecord>>, ResourceClient<InventoryRecord>) {
    ResourceActor::sharded(shards, mailbox_capacity)
}
