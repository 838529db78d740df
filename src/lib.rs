//! # Inventory Ledger
//!
//! Stock tracking for products and variants: an append-only movement ledger, time-bounded
//! reservations against pending orders, and low-stock alerts.
//!
//! Every read-modify-write on a record runs inside the actor shard that owns the record's
//! key (see [`actor_framework`]), so concurrent reservations can never oversubscribe
//! stock. Each change commits its ledger row before the record is replaced, which keeps
//! the ledger and the record in step.
//!
//! ## Modules
//!
//! - **[model]**: data types ([`InventoryRecord`](model::InventoryRecord), movements,
//!   reservations, alerts)
//! - **[inventory_actor]**: the record store, as an [`ActorEntity`](actor_framework::ActorEntity)
//! - **[ledger]**, **[reservations]**, **[alerts]**, **[bulk]**: the operations exposed to
//!   callers
//! - **[store]**: ledger, reservation and alert tables
//! - **[clients]**: typed wrapper over the shard client
//! - **[lifecycle]**: [`InventorySystem`](lifecycle::InventorySystem) wiring, the expiry
//!   sweeper and tracing setup

pub mod alerts;
pub mod bulk;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod inventory_actor;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod reservations;
pub mod store;

pub use error::InventoryError;
