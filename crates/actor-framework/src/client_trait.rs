//! # ActorClient Trait
//!
//! Provides a common interface for resource‑specific clients, adding default `get`,
//! `delete` and `list` methods built on top of a generic `ResourceClient`.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard operations.
///
/// A domain client wraps a [`ResourceClient`] and translates [`FrameworkError`] into its
/// own error type in [`ActorClient::map_error`]. The provided methods then return domain
/// errors directly.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Bin { label: String }
/// #[derive(Debug)] struct BinCreate;
/// #[derive(Debug)] struct BinUpdate;
/// #[derive(Debug)] enum BinAction {}
/// #[derive(Debug, thiserror::Error)]
/// #[error("{0}")]
/// struct BinError(String);
///
/// impl From<String> for BinError {
///     fn from(s: String) -> Self { BinError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Bin {
///     type Id = String;
///     type Create = BinCreate;
///     type Update = BinUpdate;
///     type Action = BinAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = BinError;
///
///     fn from_create_params(label: String, _: BinCreate) -> Result<Self, Self::Error> {
///         Ok(Self { label })
///     }
///     async fn on_update(&mut self, _: BinUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: BinAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct BinClient {
///     inner: ResourceClient<Bin>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Bin> for BinClient {
///     type Error = BinError;
///
///     fn inner(&self) -> &ResourceClient<Bin> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         BinError(e.to_string())
///     }
/// }
///
/// async fn usage(client: BinClient) {
///     // get(), delete() and list() are provided automatically
///     let _ = client.get("A-01".to_string()).await;
///     let _ = client.delete("A-01".to_string()).await;
///     let _ = client.list().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by key.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete an entity by key.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// Snapshot every entity across all shards.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }
}
