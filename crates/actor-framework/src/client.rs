//! # Generic Client
//!
//! This module defines the generic client for communicating with actor shards.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type‑safe, async API for interacting with the
/// `ResourceActor<T>` shards. Every keyed request is routed to the shard that owns the
/// key, so all requests for one key are processed in order by a single task. The client
/// is cheap to clone and can be shared across tasks.
///
/// * **Cloneable** – holds only the shard senders.
/// * **Async API** – all methods resolve to `Result<…, FrameworkError>`.
/// * **Deterministic routing** – the same key always reaches the same shard.
pub struct ResourceClient<T: ActorEntity> {
    shards: Arc<[mpsc::Sender<ResourceRequest<T>>]>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            shards: Arc::clone(&self.shards),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    /// Creates a client for a single shard.
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self::from_shards(vec![sender])
    }

    /// Creates a client that routes across the given shards.
    pub fn from_shards(senders: Vec<mpsc::Sender<ResourceRequest<T>>>) -> Self {
        Self {
            shards: senders.into(),
        }
    }

    /// Number of shards this client routes across.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard that owns `id`.
    pub fn shard_for(&self, id: &T::Id) -> usize {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    async fn send(&self, id: &T::Id, request: ResourceRequest<T>) -> Result<(), FrameworkError> {
        self.shards[self.shard_for(id)]
            .send(request)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    pub async fn create(&self, id: T::Id, params: T::Create) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            &id,
            ResourceRequest::Create {
                id: id.clone(),
                params,
                respond_to,
            },
        )
        .await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            &id,
            ResourceRequest::Get {
                id: id.clone(),
                respond_to,
            },
        )
        .await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            &id,
            ResourceRequest::Update {
                id: id.clone(),
                update,
                respond_to,
            },
        )
        .await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            &id,
            ResourceRequest::Delete {
                id: id.clone(),
                respond_to,
            },
        )
        .await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.perform_action_until(id, action, None).await
    }

    /// Performs an action that the shard must start before `deadline`.
    ///
    /// A request that reaches its shard too late is answered with
    /// [`FrameworkError::DeadlineExceeded`] and has no effect. Once started, the action
    /// runs to completion and its outcome is returned.
    pub async fn perform_action_until(
        &self,
        id: T::Id,
        action: T::Action,
        deadline: Option<Instant>,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            &id,
            ResourceRequest::Action {
                id: id.clone(),
                action,
                deadline,
                respond_to,
            },
        )
        .await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Collects a snapshot of every entity across all shards.
    ///
    /// Each shard answers independently, so the result is not a point-in-time view of
    /// the whole resource.
    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let mut items = Vec::new();
        for shard in self.shards.iter() {
            let (respond_to, response) = oneshot::channel();
            shard
                .send(ResourceRequest::List { respond_to })
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            items.extend(response.await.map_err(|_| FrameworkError::ActorDropped)??);
        }
        Ok(items)
    }
}
