use crate::alerts::AlertEngine;
use crate::bulk::BulkCoordinator;
use crate::catalog::Catalog;
use crate::clients::InventoryClient;
use crate::config::LedgerConfig;
use crate::error::InventoryError;
use crate::inventory_actor::{self, InventoryContext};
use crate::ledger::MovementLedger;
use crate::lifecycle::sweeper::Sweeper;
use crate::model::InventorySummary;
use crate::reservations::ReservationManager;
use crate::store::{AlertStore, LedgerStore, MemoryStore};
use actor_framework::spawn_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running inventory ledger: shards, components and the expiry sweeper.
///
/// Components are plain cloneable handles. Clone them freely while the system runs, but
/// drop every clone before calling [`InventorySystem::shutdown`]; a shard only exits once
/// no client can reach it.
pub struct InventorySystem {
    pub inventory: InventoryClient,
    pub ledger: MovementLedger,
    pub reservations: ReservationManager,
    pub alerts: AlertEngine,
    pub bulk: BulkCoordinator,
    sweeper: Sweeper,
    handles: Vec<JoinHandle<()>>,
}

impl InventorySystem {
    /// Spawns the shards, wires their context and starts the sweeper.
    pub fn start<S>(
        config: &LedgerConfig,
        catalog: Arc<dyn Catalog>,
        store: Arc<S>,
    ) -> Result<Self, InventoryError>
    where
        S: LedgerStore + AlertStore + 'static,
    {
        config.validate()?;
        info!(?config, "Starting inventory system");

        let ledger_store: Arc<dyn LedgerStore> = store.clone();
        let alert_store: Arc<dyn AlertStore> = store;
        let alerts = AlertEngine::new(alert_store);

        // 1. Create shards (no dependencies yet)
        let (shards, generic_client) =
            inventory_actor::new(config.shards, config.mailbox_capacity);
        let inventory = InventoryClient::new(generic_client);

        // 2. Start shards with their dependencies injected
        let context = InventoryContext {
            catalog,
            ledger: ledger_store.clone(),
            alerts: alerts.clone(),
        };
        let handles = spawn_all(shards, context);

        // 3. Components on top of the client
        let ledger = MovementLedger::new(inventory.clone(), ledger_store.clone());
        let reservations =
            ReservationManager::new(inventory.clone(), ledger_store, config.reservation_ttl());
        let bulk = BulkCoordinator::new(ledger.clone());
        let sweeper = Sweeper::spawn(reservations.clone(), config.sweep_interval());

        Ok(Self {
            inventory,
            ledger,
            reservations,
            alerts,
            bulk,
            sweeper,
            handles,
        })
    }

    /// Starts a system backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: &LedgerConfig, catalog: Arc<dyn Catalog>) -> Result<Self, InventoryError> {
        Self::start(config, catalog, Arc::new(MemoryStore::new()))
    }

    /// Aggregate stock counts plus the number of open alerts.
    pub async fn summary(&self) -> Result<InventorySummary, InventoryError> {
        let mut summary = self.inventory.stock_summary().await?;
        summary.open_alerts = self.alerts.open_count().await?;
        Ok(summary)
    }

    /// Stops the sweeper, drops every client, then waits for each shard to drain.
    pub async fn shutdown(self) -> Result<(), InventoryError> {
        info!("Shutting down inventory system");
        let Self {
            inventory,
            ledger,
            reservations,
            alerts,
            bulk,
            sweeper,
            handles,
        } = self;

        let mut failed = 0;
        if let Err(e) = sweeper.stop().await {
            error!(error = %e, "Sweeper task failed");
            failed += 1;
        }

        // Drop clients to signal shutdown
        drop(bulk);
        drop(reservations);
        drop(ledger);
        drop(inventory);
        drop(alerts);

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Shard task failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(InventoryError::ActorCommunication(format!(
                "{} task(s) failed during shutdown",
                failed
            )));
        }
        info!("Inventory system stopped");
        Ok(())
    }
}
