//! # Sharded Actor Server
//!
//! This module defines the `ResourceActor`, the server half of the framework. A
//! `ResourceActor` owns a *shard* of entities and processes its mailbox sequentially,
//! which makes it the single writer for every key it owns.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One shard of a keyed resource.
///
/// # Concurrency Model
/// Each shard runs in its own Tokio task and processes one message at a time, so the
/// entities in `store` need no `Mutex`. A key always hashes to the same shard (see
/// [`ResourceClient`]), which serializes every read-modify-write on that key. Keys that
/// land on different shards are processed in parallel.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call [`ResourceActor::sharded`] (or [`ResourceActor::new`] for a single
///     shard) to get the shards (servers) and the client (interface).
/// 2.  **Wire**: Pass dependencies into `run(context)`.
/// 3.  **Run**: Spawn each shard's run loop in a background task, or use [`spawn_all`].
///
/// ```rust
/// use actor_framework::{spawn_all, ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Counter { value: u32 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] struct CounterUpdate;
/// #[derive(Debug)] enum CounterAction { Increment }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// #[async_trait]
/// impl ActorEntity for Counter {
///     type Id = String;
///     type Create = CounterCreate;
///     type Update = CounterUpdate;
///     type Action = CounterAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = CounterError;
///
///     fn from_create_params(_: String, _: CounterCreate) -> Result<Self, Self::Error> { Ok(Self { value: 0 }) }
///     async fn on_update(&mut self, _: CounterUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: CounterAction, _: &()) -> Result<u32, Self::Error> {
///         self.value += 1;
///         Ok(self.value)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (shards, client) = ResourceActor::<Counter>::sharded(4, 16);
///     let _handles = spawn_all(shards, ());
///
///     client.create("a".to_string(), CounterCreate).await.unwrap();
///     let value = client.perform_action("a".to_string(), CounterAction::Increment).await.unwrap();
///     assert_eq!(value, 1);
/// }
/// ```
///
/// ## Operations
///
/// * **Create**: rejects a key that already exists, builds the entity with
///   `T::from_create_params`, runs `on_create`, then inserts it.
/// * **Get**: returns a clone of the entity if found, or `None`.
/// * **Update** / **Action**: run the hook against a draft clone and store the draft only
///   on success.
/// * **Delete**: runs the `on_delete` veto hook, then removes the entity.
/// * **List**: returns clones of every entity in the shard.
///
/// Actions whose caller has already gone away are skipped, and actions whose deadline has
/// passed are rejected with [`FrameworkError::DeadlineExceeded`] before any work starts.
pub struct ResourceActor<T: ActorEntity> {
    shard: usize,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a single-shard actor and its client.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            shard: 0,
            receiver,
            store: HashMap::new(),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Creates `shards` actors and one client that routes each key to its owning shard.
    ///
    /// A shard count of zero is treated as one.
    pub fn sharded(shards: usize, buffer_size: usize) -> (Vec<Self>, ResourceClient<T>) {
        let shards = shards.max(1);
        let mut actors = Vec::with_capacity(shards);
        let mut senders = Vec::with_capacity(shards);
        for shard in 0..shards {
            let (sender, receiver) = mpsc::channel(buffer_size);
            senders.push(sender);
            actors.push(Self {
                shard,
                receiver,
                store: HashMap::new(),
            });
        }
        (actors, ResourceClient::from_shards(senders))
    }

    /// Runs the shard's event loop, processing messages until every client is dropped.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This allows entities
    /// to reach dependencies that were created *after* the shard was instantiated but
    /// *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let shard = self.shard;
        info!(entity_type, shard, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?params, "Create");
                    if self.store.contains_key(&id) {
                        warn!(entity_type, shard, %id, "Already exists");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    let mut item = match T::from_create_params(id.clone(), params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, shard, %id, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, shard, %id, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.insert(id.clone(), item);
                    info!(entity_type, shard, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, shard, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?update, "Update");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut draft = item.clone();
                    match draft.on_update(update, &context).await {
                        Ok(()) => {
                            *item = draft;
                            info!(entity_type, shard, %id, "Updated");
                            let _ = respond_to.send(Ok(item.clone()));
                        }
                        Err(e) => {
                            warn!(entity_type, shard, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, shard, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, shard, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, shard, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    deadline,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?action, "Action");
                    if respond_to.is_closed() {
                        debug!(entity_type, shard, %id, "Caller gone, action skipped");
                        continue;
                    }
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        warn!(entity_type, shard, %id, "Deadline exceeded, action not started");
                        let _ = respond_to.send(Err(FrameworkError::DeadlineExceeded));
                        continue;
                    }
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut draft = item.clone();
                    let result = draft.handle_action(action, &context).await;
                    match result {
                        Ok(output) => {
                            *item = draft;
                            info!(entity_type, shard, %id, "Action ok");
                            let _ = respond_to.send(Ok(output));
                        }
                        Err(e) => {
                            warn!(entity_type, shard, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, shard, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
            }
        }

        info!(entity_type, shard, size = self.store.len(), "Shutdown");
    }
}

/// Spawns every shard with a clone of `context` and returns the task handles.
pub fn spawn_all<T>(actors: Vec<ResourceActor<T>>, context: T::Context) -> Vec<JoinHandle<()>>
where
    T: ActorEntity,
    T::Context: Clone + 'static,
{
    actors
        .into_iter()
        .map(|actor| tokio::spawn(actor.run(context.clone())))
        .collect()
}
