//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Shard lifecycle**: startup and shutdown per shard, with the number of records held
//! - **Stock changes**: every committed movement, reservation, release and fulfilment
//! - **Alerts**: opened and resolved alerts
//! - **Failures**: rejected operations at `warn`, invariant violations at `error`
//!
//! ## Usage Examples
//!
//! ```bash
//! # State changes only
//! RUST_LOG=info cargo run
//!
//! # Full payloads for every request
//! RUST_LOG=debug cargo run
//!
//! # Quiet shards, chatty ledger
//! RUST_LOG=warn,inventory_ledger::ledger=debug cargo run
//! ```

/// Initializes the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
