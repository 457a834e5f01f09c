//! # Mock Framework
//!
//! Utilities for testing typed clients without running a real actor.
//!
//! Two styles are supported:
//!
//! - [`MockClient`]: queue expectations up front with a fluent builder, then
//!   call [`MockClient::verify`] at the end of the test.
//! - [`create_mock_client`] plus [`expect_open`] / [`expect_action`] /
//!   [`expect_get`]: receive each request yourself, inspect it, and answer on
//!   its response channel. Handy when the test needs to look at the action payload.

use super::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the canned response for it.
enum Expectation<T: ActorEntity> {
    Open {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    Close {
        id: T::Id,
        response: Result<bool, FrameworkError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Expectations are consumed in order; a request that does not match the next
/// expectation (wrong kind or wrong id) panics the mock task, which surfaces in
/// the test as `ActorDropped`.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<PackOrder>::new();
/// mock.expect_action(OrderId(7)).return_ok(PackActionResult::Saved(PackStatus::Opened));
///
/// let client = PackClient::new(mock.client(), Duration::from_secs(30));
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Open { id, respond_to },
                        Some(Expectation::Open { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Close { id, respond_to },
                        Some(Expectation::Close { id: expected, response }),
                    ) if id == expected => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
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

    /// Expects an `open` operation.
    pub fn expect_open(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(id, |id, response| Expectation::Open { id, response })
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(id, |id, response| Expectation::Get { id, response })
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(id, |id, response| Expectation::Action { id, response })
    }

    /// Expects a `close` operation.
    pub fn expect_close(&mut self, id: T::Id) -> ExpectationBuilder<T, bool> {
        self.builder(id, |id, response| Expectation::Close { id, response })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn builder<R>(
        &self,
        id: T::Id,
        make: fn(T::Id, Result<R, FrameworkError>) -> Expectation<T>,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            id,
            make,
            expectations: self.expectations.clone(),
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder that records the response for one expected request.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    id: T::Id,
    make: fn(T::Id, Result<R, FrameworkError>) -> Expectation<T>,
    expectations: Expectations<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let expectation = (self.make)(self.id, Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.make)(self.id, Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// The test plays the actor: it pulls requests off `receiver`, checks them, and
/// answers on the embedded response channel. This makes success, failure and
/// slow responses fully deterministic.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Open request
pub async fn expect_open<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<T, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Open { id, respond_to }) => Some((id, respond_to)),
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
#[allow(clippy::type_complexity)]
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
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, PackOrder};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<PackOrder>(10);

        let open_task = tokio::spawn(async move { client.open(OrderId(5)).await });

        let (id, responder) = expect_open(&mut receiver)
            .await
            .expect("Expected Open request");
        assert_eq!(id, OrderId(5));
        responder.send(Ok(PackOrder::new(OrderId(5), vec![], vec![]))).unwrap();

        let opened = open_task.await.unwrap().unwrap();
        assert_eq!(opened.id, OrderId(5));
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<PackOrder>::new();

        mock.expect_open(OrderId(1))
            .return_ok(PackOrder::new(OrderId(1), vec![], vec![]));
        mock.expect_get(OrderId(1)).return_ok(None);
        mock.expect_close(OrderId(1)).return_ok(true);

        let client = mock.client();
        assert_eq!(client.open(OrderId(1)).await.unwrap().id, OrderId(1));
        assert!(client.get(OrderId(1)).await.unwrap().is_none());
        assert!(client.close(OrderId(1)).await.unwrap());

        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_client_mismatch_drops_response() {
        let mut mock = MockClient::<PackOrder>::new();
        mock.expect_open(OrderId(1))
            .return_ok(PackOrder::new(OrderId(1), vec![], vec![]));

        let err = mock.client().open(OrderId(2)).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorDropped));
    }
}
