//! # Actor Framework
//!
//! Building blocks for **single-writer-per-key** state on top of Tokio. Entities of one
//! resource type are spread over a fixed set of shards; each shard is an actor that owns
//! its entities outright and drains its mailbox one message at a time. Because a key
//! always hashes to the same shard, every read-modify-write on that key is serialized
//! without locks, while unrelated keys on other shards proceed in parallel.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - business logic, expressed as lifecycle hooks
//!    and custom actions.
//! 2. **Runtime Layer** ([`ResourceActor`]) - the shard loop: message processing,
//!    draft-and-commit mutation, deadlines.
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - routing and type-safe
//!    communication.
//!
//! ## Draft-and-commit
//!
//! `Update` and `Action` hooks run against a clone of the entity. The shard swaps the
//! clone in only when the hook succeeds, so a rejected operation leaves no trace on the
//! entity.
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction time.
//! All shards of one resource receive clones of the same context (see [`spawn_all`]).
//!
//! ## Shutdown
//!
//! A shard exits when every [`ResourceClient`] clone pointing at it has been dropped.
//!
//! ## Testing
//!
//! The [`mock`] module provides a `MockClient` that answers requests from a queue of
//! expectations, for testing client-side orchestration without spawning shards.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::{spawn_all, ResourceActor};
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
