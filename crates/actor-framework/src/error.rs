//! # Framework Errors
//!
//! This module defines the common error types used throughout the actor framework.
//! Domain crates map these back into their own error enums (see
//! [`ActorClient::map_error`](crate::ActorClient::map_error)).

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    /// The request reached the actor after its deadline and was not started.
    #[error("Deadline exceeded before the request was processed")]
    DeadlineExceeded,
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}
