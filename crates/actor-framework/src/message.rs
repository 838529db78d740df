//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `ResourceClient` and the `ResourceActor` shards.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to a shard to request operations.
///
/// # Resource-Oriented Architecture
/// Each shard manages a slice of one resource type (the [`ActorEntity`]). Instead of
/// defining ad-hoc messages for every operation, requests are standardized around the
/// lifecycle operations that apply to almost any persistent resource, plus `Action`
/// for resource-specific logic.
///
/// - **Create**: Lifecycle start. The caller supplies the key, so creation is routed to
///   the shard that will own the entity and a duplicate key is rejected.
/// - **Get (Read)**: Fetches a snapshot of the entity.
/// - **Update**: State mutation through [`ActorEntity::Update`].
/// - **Delete**: Lifecycle end.
/// - **Action**: Executes a custom [`ActorEntity::Action`], optionally bounded by a deadline.
/// - **List**: Snapshot of every entity held by the shard.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        deadline: Option<Instant>,
        respond_to: Response<T::ActionResult>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
}

impl<T: ActorEntity> ResourceRequest<T> {
    /// The key this request is addressed to, if it targets a single entity.
    pub fn id(&self) -> Option<&T::Id> {
        match self {
            ResourceRequest::Create { id, .. }
            | ResourceRequest::Get { id, .. }
            | ResourceRequest::Update { id, .. }
            | ResourceRequest::Delete { id, .. }
            | ResourceRequest::Action { id, .. } => Some(id),
            ResourceRequest::List { .. } => None,
        }
    }
}
