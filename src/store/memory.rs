//! In-process implementation of the ledger and alert tables.

use super::{AlertStore, ExpiryCursor, LedgerStore, LedgerWrite};
use crate::error::InventoryError;
use crate::model::{
    AlertDraft, AlertFilter, AlertId, AlertType, InventoryAlert, InventoryMovement, MovementId,
    OrderId, ReservationId, StockKey, StockReservation,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Bound;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct LedgerTables {
    last_movement: u64,
    movements: Vec<InventoryMovement>,
    movements_by_key: HashMap<StockKey, Vec<usize>>,
    reservations: HashMap<ReservationId, StockReservation>,
    by_order: HashMap<OrderId, HashSet<ReservationId>>,
    by_key: HashMap<StockKey, HashSet<ReservationId>>,
    by_expiry: BTreeSet<(DateTime<Utc>, ReservationId)>,
}

impl LedgerTables {
    fn insert_reservation(&mut self, reservation: StockReservation) {
        self.by_order
            .entry(reservation.order_id)
            .or_default()
            .insert(reservation.id);
        self.by_key
            .entry(reservation.key)
            .or_default()
            .insert(reservation.id);
        self.by_expiry
            .insert((reservation.expires_at, reservation.id));
        self.reservations.insert(reservation.id, reservation);
    }

    fn remove_reservation(&mut self, id: ReservationId) -> Option<StockReservation> {
        let reservation = self.reservations.remove(&id)?;
        if let Some(ids) = self.by_order.get_mut(&reservation.order_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_order.remove(&reservation.order_id);
            }
        }
        if let Some(ids) = self.by_key.get_mut(&reservation.key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_key.remove(&reservation.key);
            }
        }
        self.by_expiry.remove(&(reservation.expires_at, id));
        Some(reservation)
    }

    fn collect(&self, ids: Option<&HashSet<ReservationId>>) -> Vec<StockReservation> {
        let mut found: Vec<StockReservation> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.reservations.get(id).cloned())
            .collect();
        found.sort_by_key(|r| (r.created_at, r.id));
        found
    }
}

#[derive(Default)]
struct AlertTables {
    alerts: Vec<InventoryAlert>,
    by_id: HashMap<AlertId, usize>,
    open: HashMap<(StockKey, AlertType), AlertId>,
}

/// Ledger and alert tables held in memory behind async mutexes.
///
/// Each table group has its own lock, held only for the duration of one call.
#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<LedgerTables>,
    alerts: Mutex<AlertTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn commit(&self, write: LedgerWrite) -> Result<InventoryMovement, InventoryError> {
        let mut tables = self.ledger.lock().await;

        // Validate everything before touching any table.
        if let Some(id) = write.release {
            if !tables.reservations.contains_key(&id) {
                return Err(InventoryError::NotFound(id.to_string()));
            }
        }
        if let Some(reservation) = &write.reserve {
            if tables.reservations.contains_key(&reservation.id) {
                return Err(InventoryError::AlreadyExists(reservation.id.to_string()));
            }
        }

        if let Some(id) = write.release {
            tables.remove_reservation(id);
        }
        if let Some(reservation) = write.reserve {
            tables.insert_reservation(reservation);
        }

        tables.last_movement += 1;
        let movement = write
            .movement
            .into_movement(MovementId(tables.last_movement));
        let index = tables.movements.len();
        tables
            .movements_by_key
            .entry(movement.key)
            .or_default()
            .push(index);
        tables.movements.push(movement.clone());
        debug!(movement_id = %movement.id, key = %movement.key, kind = movement.kind.as_str(), "Movement committed");
        Ok(movement)
    }

    async fn movements(
        &self,
        key: &StockKey,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<InventoryMovement>, InventoryError> {
        let tables = self.ledger.lock().await;
        let found = tables
            .movements_by_key
            .get(key)
            .into_iter()
            .flatten()
            .map(|&index| &tables.movements[index])
            .filter(|m| since.map_or(true, |since| m.created_at >= since))
            .cloned()
            .collect();
        Ok(found)
    }

    async fn reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<StockReservation>, InventoryError> {
        Ok(self.ledger.lock().await.reservations.get(&id).cloned())
    }

    async fn reservations_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StockReservation>, InventoryError> {
        let tables = self.ledger.lock().await;
        let found = tables.collect(tables.by_order.get(&order_id));
        Ok(found)
    }

    async fn reservations_for_key(
        &self,
        key: &StockKey,
    ) -> Result<Vec<StockReservation>, InventoryError> {
        let tables = self.ledger.lock().await;
        let found = tables.collect(tables.by_key.get(key));
        Ok(found)
    }

    async fn expired_reservations(
        &self,
        now: DateTime<Utc>,
        after: Option<ExpiryCursor>,
        limit: usize,
    ) -> Result<Vec<StockReservation>, InventoryError> {
        let start = match after {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };
        let tables = self.ledger.lock().await;
        let found = tables
            .by_expiry
            .range((start, Bound::Unbounded))
            .take_while(|(expires_at, _)| *expires_at < now)
            .take(limit)
            .filter_map(|(_, id)| tables.reservations.get(id).cloned())
            .collect();
        Ok(found)
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn open_alert_if_absent(
        &self,
        draft: AlertDraft,
    ) -> Result<Option<InventoryAlert>, InventoryError> {
        let mut tables = self.alerts.lock().await;
        let slot = (draft.key, draft.alert_type);
        if tables.open.contains_key(&slot) {
            return Ok(None);
        }
        let alert = draft.into_alert(AlertId::new());
        let index = tables.alerts.len();
        tables.by_id.insert(alert.id, index);
        tables.open.insert(slot, alert.id);
        tables.alerts.push(alert.clone());
        Ok(Some(alert))
    }

    async fn open_alerts(&self, key: &StockKey) -> Result<Vec<InventoryAlert>, InventoryError> {
        let tables = self.alerts.lock().await;
        let found = tables
            .open
            .iter()
            .filter(|((alert_key, _), _)| alert_key == key)
            .filter_map(|(_, id)| tables.by_id.get(id))
            .map(|&index| tables.alerts[index].clone())
            .collect();
        Ok(found)
    }

    async fn resolve_alert(
        &self,
        id: AlertId,
        at: DateTime<Utc>,
    ) -> Result<InventoryAlert, InventoryError> {
        let mut tables = self.alerts.lock().await;
        let index = *tables
            .by_id
            .get(&id)
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))?;
        let alert = &mut tables.alerts[index];
        if alert.is_resolved {
            return Err(InventoryError::AlreadyResolved(id.to_string()));
        }
        alert.is_resolved = true;
        alert.resolved_at = Some(at);
        let resolved = alert.clone();
        tables.open.remove(&(resolved.key, resolved.alert_type));
        Ok(resolved)
    }

    async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<InventoryAlert>, InventoryError> {
        let tables = self.alerts.lock().await;
        let found = tables
            .alerts
            .iter()
            .rev()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect();
        Ok(found)
    }
}
