//! Error types for the inventory ledger.

use actor_framework::FrameworkError;
use thiserror::Error;
use tracing::error;

/// Errors returned by every inventory operation.
///
/// Record, ledger, reservation and alert operations share one enum so that a failure can
/// travel from a shard back to the caller unchanged (see the `From<FrameworkError>` impl).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// A record, reservation, alert or catalog entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record for this key already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A movement asks for more than the record holds, or a reservation for more than is
    /// available.
    #[error("Insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock {
        key: String,
        requested: u32,
        available: u32,
    },

    /// The write would break `available == quantity - reserved` or drive a counter below zero.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The record cannot be deleted while reservations reference it.
    #[error("{key} has {open} open reservation(s)")]
    HasOpenReservations { key: String, open: usize },

    #[error("Alert already resolved: {0}")]
    AlreadyResolved(String),

    /// The request itself is malformed (zero quantity, inverted thresholds, bad config).
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Deadline exceeded before the operation started")]
    DeadlineExceeded,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl InventoryError {
    /// Builds an [`InventoryError::InvariantViolation`] and logs it at `error` level.
    ///
    /// A violation always means a bug in a caller or corrupted counters, so it is
    /// reported where it is detected rather than left to whoever handles the result.
    pub fn invariant(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(violation = %detail, "Quantity invariant violated");
        InventoryError::InvariantViolation(detail)
    }

    /// HTTP-equivalent status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            InventoryError::NotFound(_) => 404,
            InventoryError::AlreadyExists(_)
            | InventoryError::HasOpenReservations { .. }
            | InventoryError::AlreadyResolved(_) => 409,
            InventoryError::InsufficientStock { .. } | InventoryError::Validation(_) => 400,
            InventoryError::DeadlineExceeded => 504,
            InventoryError::InvariantViolation(_)
            | InventoryError::Store(_)
            | InventoryError::ActorCommunication(_) => 500,
        }
    }

    /// True for failures that indicate a fault on our side and should page someone.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            InventoryError::InvariantViolation(_)
                | InventoryError::Store(_)
                | InventoryError::ActorCommunication(_)
        )
    }
}

impl From<String> for InventoryError {
    fn from(msg: String) -> Self {
        InventoryError::ActorCommunication(msg)
    }
}

impl From<FrameworkError> for InventoryError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => InventoryError::NotFound(id),
            FrameworkError::AlreadyExists(id) => InventoryError::AlreadyExists(id),
            FrameworkError::DeadlineExceeded => InventoryError::DeadlineExceeded,
            FrameworkError::EntityError(inner) => match inner.downcast::<InventoryError>() {
                Ok(domain) => *domain,
                Err(other) => InventoryError::ActorCommunication(other.to_string()),
            },
            other => InventoryError::ActorCommunication(other.to_string()),
        }
    }
}
