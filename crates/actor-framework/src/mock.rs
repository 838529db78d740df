//! # Scripted Clients
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered
//! from a queue of expectations instead of by a shard. Code that sits *around* a client
//! (fan-out over several keys, result matching, error mapping) can be tested without
//! spawning shards or building entity state.
//!
//! Every request must match the next queued expectation by kind and key; a mismatch
//! panics inside the responder task and the caller sees `ActorDropped`. Prefer real
//! shards when the behavior under test lives in the entity hooks themselves.
//!
//! ## Example
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Shelf { slots: u32 }
//! #[derive(Debug)] struct ShelfCreate;
//! #[derive(Debug)] struct ShelfUpdate;
//! #[derive(Debug)] enum ShelfAction {}
//! #[derive(Debug, thiserror::Error)] #[error("Err")] struct ShelfError;
//!
//! #[async_trait]
//! impl ActorEntity for Shelf {
//!     type Id = u32; type Create = ShelfCreate; type Update = ShelfUpdate;
//!     type Action = ShelfAction; type ActionResult = (); type Context = (); type Error = ShelfError;
//!     fn from_create_params(_: u32, _: ShelfCreate) -> Result<Self, Self::Error> { Ok(Self { slots: 0 }) }
//!     async fn on_update(&mut self, _: ShelfUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: ShelfAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Shelf>::new();
//!     let client = mock.client();
//!
//!     // Simulate a downstream failure
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!
//!     let result = client.get(1).await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! ## Low-level helpers
//!
//! Use [`create_mock_client`] to get a client plus the raw receiver, then the
//! `expect_*` functions to pull requests off it and answer them by hand.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response to give it.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        id: T::Id,
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
}

type ExpectationQueue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Expectations are consumed in order. A request that does not match the next
/// expectation (wrong operation or wrong key) makes the mock task panic, which the
/// caller observes as [`FrameworkError::ActorDropped`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: ExpectationQueue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: ExpectationQueue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "get called with unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { id, respond_to, .. },
                        Some(Expectation::Create { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "create called with unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "update called with unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "delete called with unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "action called with unexpected key");
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request for key {:?}", request.id());
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| Expectation::Get {
            id,
            response,
        })
    }

    /// Expects a `create` operation for `id`.
    pub fn expect_create(&mut self, id: T::Id) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Create { id, response }
        })
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Update { id, response }
        })
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Delete { id, response }
        })
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), move |response| {
            Expectation::Action { id, response }
        })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::List {
            response,
        })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder that completes an expectation with its response.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: ExpectationQueue<T>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: ExpectationQueue<T>,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self {
            expectations,
            make: Box::new(make),
        }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let expectation = (self.make)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.make)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Pull requests off the receiver with the `expect_*` helpers below and answer them
/// through the returned responder. This gives full control over timing, which is
/// useful for testing what a caller does while a request is still in flight.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Create,
    oneshot::Sender<Result<T::Id, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create {
            id,
            params,
            respond_to,
        }) => Some((id, params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
            ..
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
