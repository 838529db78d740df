use crate::error::InventoryError;
use crate::model::{ProductId, StockKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock level thresholds. They never constrain movements; they only drive alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_stock_level: u32,
    pub max_stock_level: Option<u32>,
    pub reorder_point: u32,
}

impl Thresholds {
    pub fn with_reorder_point(reorder_point: u32) -> Self {
        Self {
            reorder_point,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InventoryError> {
        match self.max_stock_level {
            Some(max) if max < self.min_stock_level => Err(InventoryError::Validation(format!(
                "max_stock_level {} is below min_stock_level {}",
                max, self.min_stock_level
            ))),
            _ => Ok(()),
        }
    }
}

/// Current stock counters for one product or variant.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor) shard.
///
/// See [`impl ActorEntity for InventoryRecord`](#impl-ActorEntity-for-InventoryRecord) for details on:
/// - Creation parameters ([`InventoryCreate`])
/// - Update parameters ([`InventoryUpdate`])
/// - Stock actions ([`StockAction`](crate::inventory_actor::StockAction))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub key: StockKey,
    /// Total units owned.
    pub quantity: u32,
    /// Units held by active reservations. Never exceeds `quantity`.
    pub reserved_quantity: u32,
    pub thresholds: Thresholds,
    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(key: StockKey, quantity: u32, thresholds: Thresholds, now: DateTime<Utc>) -> Self {
        Self {
            key,
            quantity,
            reserved_quantity: 0,
            thresholds,
            last_restocked: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Units that can still be reserved or sold.
    pub fn available_quantity(&self) -> u32 {
        self.quantity.saturating_sub(self.reserved_quantity)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available_quantity() == 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.available_quantity() <= self.thresholds.reorder_point
    }

    pub fn counters(&self) -> StockCounters {
        StockCounters {
            quantity: i64::from(self.quantity),
            reserved_quantity: i64::from(self.reserved_quantity),
            available_quantity: i64::from(self.available_quantity()),
        }
    }

    pub fn check_invariant(&self) -> Result<(), InventoryError> {
        if self.reserved_quantity > self.quantity {
            return Err(InventoryError::invariant(format!(
                "{}: reserved {} exceeds quantity {}",
                self.key, self.reserved_quantity, self.quantity
            )));
        }
        Ok(())
    }
}

/// Counter triple as supplied by a caller. Signed so that bad input can be represented
/// and rejected instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCounters {
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub available_quantity: i64,
}

impl StockCounters {
    pub fn is_consistent(&self) -> bool {
        self.quantity >= 0
            && self.reserved_quantity >= 0
            && self.available_quantity >= 0
            && self.available_quantity == self.quantity - self.reserved_quantity
    }
}

/// Payload for creating a new inventory record.
#[derive(Debug, Clone, Default)]
pub struct InventoryCreate {
    pub initial_quantity: u32,
    pub thresholds: Thresholds,
}

/// Payload for updating record metadata.
///
/// `counters` may echo the caller's view of the stock counters. They are checked, never
/// written: quantities only change through movements and reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub thresholds: Option<Thresholds>,
    pub counters: Option<StockCounters>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    pub product_id: Option<ProductId>,
    pub low_stock_only: bool,
    pub out_of_stock_only: bool,
}

impl InventoryFilter {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        self.product_id
            .map_or(true, |product_id| record.key.product_id == product_id)
            && (!self.low_stock_only || record.is_low_stock())
            && (!self.out_of_stock_only || record.is_out_of_stock())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Matches before paging.
    pub total: usize,
}

/// Aggregate counts across every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_records: usize,
    pub total_quantity: u64,
    pub total_reserved: u64,
    pub total_available: u64,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub open_alerts: usize,
}

impl InventorySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InventoryRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut summary, record| {
                summary.total_records += 1;
                summary.total_quantity += u64::from(record.quantity);
                summary.total_reserved += u64::from(record.reserved_quantity);
                summary.total_available += u64::from(record.available_quantity());
                if record.is_out_of_stock() {
                    summary.out_of_stock += 1;
                } else if record.is_low_stock() {
                    summary.low_stock += 1;
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: u32, reserved: u32, reorder_point: u32) -> InventoryRecord {
        let mut record = InventoryRecord::new(
            StockKey::product(ProductId::new()),
            quantity,
            Thresholds::with_reorder_point(reorder_point),
            Utc::now(),
        );
        record.reserved_quantity = reserved;
        record
    }

    #[test]
    fn test_available_is_derived() {
        let record = record(10, 4, 2);
        assert_eq!(record.available_quantity(), 6);
        assert!(record.counters().is_consistent());
        assert!(record.check_invariant().is_ok());
    }

    #[test]
    fn test_reserved_above_quantity_is_violation() {
        let record = record(3, 5, 0);
        assert!(matches!(
            record.check_invariant(),
            Err(InventoryError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_inconsistent_counters() {
        let counters = StockCounters {
            quantity: 10,
            reserved_quantity: 4,
            available_quantity: 7,
        };
        assert!(!counters.is_consistent());
        let negative = StockCounters {
            quantity: 2,
            reserved_quantity: 4,
            available_quantity: -2,
        };
        assert!(!negative.is_consistent());
    }

    #[test]
    fn test_threshold_validation() {
        let inverted = Thresholds {
            min_stock_level: 10,
            max_stock_level: Some(5),
            reorder_point: 0,
        };
        assert!(matches!(
            inverted.validate(),
            Err(InventoryError::Validation(_))
        ));
        assert!(Thresholds::with_reorder_point(3).validate().is_ok());
    }

    #[test]
    fn test_filter_and_summary() {
        let healthy = record(100, 0, 10);
        let low = record(10, 5, 10);
        let empty = record(4, 4, 10);

        let low_only = InventoryFilter {
            low_stock_only: true,
            ..Default::default()
        };
        assert!(!low_only.matches(&healthy));
        assert!(low_only.matches(&low));
        assert!(low_only.matches(&empty));

        let by_product = InventoryFilter {
            product_id: Some(healthy.key.product_id),
            ..Default::default()
        };
        assert!(by_product.matches(&healthy));
        assert!(!by_product.matches(&low));

        let summary = InventorySummary::from_records([&healthy, &low, &empty]);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_quantity, 114);
        assert_eq!(summary.total_reserved, 9);
        assert_eq!(summary.total_available, 105);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.low_stock, 1);
    }
}
