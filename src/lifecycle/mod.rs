//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the inventory ledger.
//!
//! ## Startup
//!
//! [`InventorySystem::start`] follows the late-binding pattern of the actor framework:
//!
//! 1. **Create shards** - no dependencies yet
//! 2. **Inject context** - catalog, ledger store and alert engine go into `run(context)`
//! 3. **Build components** - ledger, reservations and bulk coordinator wrap the client
//! 4. **Start the sweeper** - a background task releasing expired reservations
//!
//! The shard context holds no inventory client, so the dependency graph is acyclic and
//! shutdown by channel closure is deterministic.
//!
//! ## Graceful Shutdown
//!
//! 1. **Stop the sweeper** - it holds a client, so it must go first
//! 2. **Drop all clients** - closes the sender side of every shard mailbox
//! 3. **Shards drain** - `receiver.recv()` returns `None` after the last queued request
//! 4. **Await completion** - a panicked shard is reported as an error
//!
//! ## Observability
//!
//! [`setup_tracing`] initializes structured logging; see the [`tracing`](self::tracing)
//! module.

pub mod inventory_system;
pub mod sweeper;
pub mod tracing;

pub use self::inventory_system::*;
pub use self::sweeper::Sweeper;
pub use self::tracing::*;
