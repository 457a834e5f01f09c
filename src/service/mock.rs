//! Scripted [`OrderService`] for tests.
//!
//! Queue the answers the backend should give, in call order, then run the
//! engine against the mock and inspect what it sent.
//!
//! ```ignore
//! let mock = MockOrderService::new();
//! mock.expect_fetch(OrderId(7)).return_ok(data);
//! mock.expect_update().return_err(ServiceError::Transport("offline".into()));
//!
//! // ... drive the engine ...
//!
//! assert_eq!(mock.updates().len(), 1);
//! mock.verify();
//! ```

use super::{OrderService, ServiceError, Session};
use crate::model::{OrderData, OrderId, UpdateOrderRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Expectation {
    Fetch {
        id: OrderId,
        response: Result<OrderData, ServiceError>,
    },
    Update {
        response: Result<(), ServiceError>,
        delay: Option<Duration>,
    },
    DistributedTarget {
        response: Result<(), ServiceError>,
    },
}

/// A call the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Fetch(OrderId),
    Update(UpdateOrderRequest),
    DistributedTarget(OrderId),
}

#[derive(Default)]
struct State {
    expectations: VecDeque<Expectation>,
    calls: Vec<RecordedCall>,
    sessions: Vec<Session>,
}

/// Cloneable handle; all clones share the same script and call log.
#[derive(Clone, Default)]
pub struct MockOrderService {
    state: Arc<Mutex<State>>,
}

impl MockOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `fetch_order` call for `id`.
    pub fn expect_fetch(&self, id: OrderId) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            id,
            state: self.state.clone(),
        }
    }

    /// Expects an `update_order` call.
    pub fn expect_update(&self) -> UpdateExpectationBuilder {
        UpdateExpectationBuilder {
            delay: None,
            state: self.state.clone(),
        }
    }

    /// Expects an `update_distributed_target` call.
    pub fn expect_distributed_target(&self) -> DistributedTargetExpectationBuilder {
        DistributedTargetExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// The bodies of every `update_order` call received so far.
    pub fn updates(&self) -> Vec<UpdateOrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Update(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// Sessions passed along with each call.
    pub fn sessions(&self) -> Vec<Session> {
        self.state.lock().unwrap().sessions.clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.state.lock().unwrap().expectations.len();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn next(&self, session: &Session, call: RecordedCall) -> Option<Expectation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.sessions.push(session.clone());
        state.expectations.pop_front()
    }
}

#[async_trait]
impl OrderService for MockOrderService {
    async fn fetch_order(&self, session: &Session, id: OrderId) -> Result<OrderData, ServiceError> {
        match self.next(session, RecordedCall::Fetch(id)) {
            Some(Expectation::Fetch { id: expected, response }) if expected == id => response,
            _ => panic!("Unexpected fetch_order({})", id),
        }
    }

    async fn update_order(&self, session: &Session, update: &UpdateOrderRequest) -> Result<(), ServiceError> {
        match self.next(session, RecordedCall::Update(update.clone())) {
            Some(Expectation::Update { response, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            _ => panic!("Unexpected update_order({})", update.order_id),
        }
    }

    async fn update_distributed_target(&self, session: &Session, id: OrderId) -> Result<(), ServiceError> {
        match self.next(session, RecordedCall::DistributedTarget(id)) {
            Some(Expectation::DistributedTarget { response }) => response,
            _ => panic!("Unexpected update_distributed_target({})", id),
        }
    }
}

/// Builder for `fetch_order` expectations.
pub struct FetchExpectationBuilder {
    id: OrderId,
    state: Arc<Mutex<State>>,
}

impl FetchExpectationBuilder {
    pub fn return_ok(self, data: OrderData) {
        self.push(Ok(data));
    }

    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<OrderData, ServiceError>) {
        self.state.lock().unwrap().expectations.push_back(Expectation::Fetch {
            id: self.id,
            response,
        });
    }
}

/// Builder for `update_order` expectations.
pub struct UpdateExpectationBuilder {
    delay: Option<Duration>,
    state: Arc<Mutex<State>>,
}

impl UpdateExpectationBuilder {
    /// Hold the answer back for `delay`, as a slow network would.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), ServiceError>) {
        self.state.lock().unwrap().expectations.push_back(Expectation::Update {
            response,
            delay: self.delay,
        });
    }
}

/// Builder for `update_distributed_target` expectations.
pub struct DistributedTargetExpectationBuilder {
    state: Arc<Mutex<State>>,
}

impl DistributedTargetExpectationBuilder {
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    pub fn return_err(self, error: ServiceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), ServiceError>) {
        self.state
            .lock()
            .unwrap()
            .expectations
            .push_back(Expectation::DistributedTarget { response });
    }
}
