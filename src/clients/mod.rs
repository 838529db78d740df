//! # Clients
//!
//! Type-safe wrappers around the generic [`ResourceClient`](actor_framework::ResourceClient).
//! They turn typed method calls into shard requests and map framework errors back into
//! [`InventoryError`](crate::error::InventoryError).

pub mod inventory_client;

pub use inventory_client::InventoryClient;
