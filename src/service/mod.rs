//! The external order service the pack engine reads from and writes to.
//!
//! [`OrderService`] is the seam: [`HttpOrderService`] talks to the real REST
//! backend, [`MockOrderService`] replays scripted answers in tests.

pub mod error;
pub mod http;
pub mod mock;

pub use error::*;
pub use http::*;
pub use mock::*;

use crate::model::{OrderData, OrderId, UpdateOrderRequest};
use async_trait::async_trait;

/// Credentials and locale of the signed-in user.
///
/// Passed explicitly into the engine instead of being read from ambient storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub locale: String,
}

impl Session {
    pub fn new(token: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            locale: locale.into(),
        }
    }
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Load an order with its packages and additional items.
    async fn fetch_order(&self, session: &Session, id: OrderId) -> Result<OrderData, ServiceError>;

    /// Persist packed flags and status.
    async fn update_order(&self, session: &Session, update: &UpdateOrderRequest) -> Result<(), ServiceError>;

    /// Refresh the distributed-target aggregate after a completed order.
    async fn update_distributed_target(&self, session: &Session, id: OrderId) -> Result<(), ServiceError>;
}
