//! Background task that releases expired reservations.

use crate::reservations::ReservationManager;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to a running sweeper.
pub struct Sweeper {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Starts sweeping every `every`. The first sweep runs one period after start.
    pub fn spawn(reservations: ReservationManager, every: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = every.as_secs(), "Sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match reservations.sweep_expired().await {
                            Ok(report) => debug!(released = report.released, failed = report.failed.len(), "Sweep tick"),
                            Err(e) => warn!(error = %e, "Sweep failed, retrying next tick"),
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Sweeper stopped");
        });
        Self { stop, handle }
    }

    /// Signals the sweeper and waits for it to finish its current pass.
    pub async fn stop(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.stop.send(true);
        self.handle.await
    }
}
