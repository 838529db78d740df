use crate::model::{AlertId, StockKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    ReorderPoint,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low_stock",
            AlertType::OutOfStock => "out_of_stock",
            AlertType::ReorderPoint => "reorder_point",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAlert {
    pub id: AlertId,
    pub key: StockKey,
    pub alert_type: AlertType,
    /// Available quantity when the alert was raised.
    pub current_quantity: u32,
    pub threshold_quantity: u32,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An alert to open if none of the same type is open for the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDraft {
    pub key: StockKey,
    pub alert_type: AlertType,
    pub current_quantity: u32,
    pub threshold_quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl AlertDraft {
    pub fn into_alert(self, id: AlertId) -> InventoryAlert {
        InventoryAlert {
            id,
            key: self.key,
            alert_type: self.alert_type,
            current_quantity: self.current_quantity,
            threshold_quantity: self.threshold_quantity,
            is_resolved: false,
            resolved_at: None,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub key: Option<StockKey>,
    pub alert_type: Option<AlertType>,
    pub unresolved_only: bool,
}

impl AlertFilter {
    pub fn open_for(key: StockKey) -> Self {
        Self {
            key: Some(key),
            alert_type: None,
            unresolved_only: true,
        }
    }

    pub fn matches(&self, alert: &InventoryAlert) -> bool {
        self.key.map_or(true, |key| alert.key == key)
            && self.alert_type.map_or(true, |t| alert.alert_type == t)
            && (!self.unresolved_only || !alert.is_resolved)
    }
}

/// Alerts opened and resolved by one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertEvaluation {
    pub opened: Vec<InventoryAlert>,
    pub resolved: Vec<InventoryAlert>,
}
