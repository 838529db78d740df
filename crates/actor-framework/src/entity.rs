//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract that every keyed resource must implement
//! to be owned by a [`ResourceActor`](crate::ResourceActor) shard. It specifies associated
//! types for keys, DTOs, actions, context, and errors, and provides lifecycle hooks
//! (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! The default implementation of both does nothing (`Ok(())`).
//!
//! # All-or-nothing hooks
//! `on_update` and `handle_action` run against a *draft copy* of the entity. The shard
//! replaces the stored entity with the draft only when the hook returns `Ok`, so a hook
//! that fails halfway through can never leave a partially mutated entity behind. Hooks
//! that write to an external store should make that write their last fallible step.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any keyed entity must implement to be managed by a `ResourceActor`.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., writing
/// to a store). It also defines a `Context` type, which is injected into every hook when the
/// shard is started. Shards of one entity type share clones of the same context.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The key for this entity. Keys are chosen by the caller and hashed to pick a shard.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the shard.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// The framework enforces a **per-entity error type** (one enum for the whole
    /// resource) rather than one error per message. Clients recover it from
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) by downcasting.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from its key and payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it becomes visible.
    /// Returning an error discards the entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed. Returning an error vetoes the delete.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
