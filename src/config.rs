//! Configuration for the inventory ledger.
//!
//! Loaded in layers:
//! 1. Default values in code
//! 2. An optional `inventory-ledger.toml` in the working directory
//! 3. Environment variable overrides with the `INVENTORY_` prefix (`INVENTORY_SHARDS=16`)

use crate::error::InventoryError;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Longest default reservation lifetime accepted: one year.
pub const MAX_RESERVATION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Number of inventory shards.
    pub shards: usize,

    /// Mailbox capacity per shard.
    pub mailbox_capacity: usize,

    /// Reservation lifetime when the caller gives none.
    pub reservation_ttl_secs: u64,

    /// Time between expiry sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            shards: 8,
            mailbox_capacity: 64,
            reservation_ttl_secs: 900,
            sweep_interval_secs: 30,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from the optional file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = config::Config::builder()
            .set_default("shards", defaults.shards as u64)?
            .set_default("mailbox_capacity", defaults.mailbox_capacity as u64)?
            .set_default("reservation_ttl_secs", defaults.reservation_ttl_secs)?
            .set_default("sweep_interval_secs", defaults.sweep_interval_secs)?
            .add_source(File::with_name("inventory-ledger").required(false))
            .add_source(Environment::with_prefix("INVENTORY").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), InventoryError> {
        let zero = [
            ("shards", self.shards as u64),
            ("mailbox_capacity", self.mailbox_capacity as u64),
            ("reservation_ttl_secs", self.reservation_ttl_secs),
            ("sweep_interval_secs", self.sweep_interval_secs),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero {
            return Err(InventoryError::Validation(format!("{} must be positive", name)));
        }
        if self.reservation_ttl_secs > MAX_RESERVATION_TTL_SECS {
            return Err(InventoryError::Validation(format!(
                "reservation_ttl_secs must be at most {}, got {}",
                MAX_RESERVATION_TTL_SECS, self.reservation_ttl_secs
            )));
        }
        Ok(())
    }

    /// Default reservation lifetime, capped at [`MAX_RESERVATION_TTL_SECS`].
    pub fn reservation_ttl(&self) -> chrono::Duration {
        let secs = self.reservation_ttl_secs.min(MAX_RESERVATION_TTL_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::days(365))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
