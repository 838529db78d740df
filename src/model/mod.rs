//! # Data Model
//!
//! Plain data for the inventory ledger: identifiers, stock records, ledger rows,
//! reservations and alerts. [`InventoryRecord`] is the only entity owned by actor shards;
//! everything else lives in the store.

pub mod alert;
pub mod ids;
pub mod movement;
pub mod record;
pub mod reservation;

pub use alert::*;
pub use ids::*;
pub use movement::*;
pub use record::*;
pub use reservation::*;
