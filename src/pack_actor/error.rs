//! Error types for the pack actor.

use crate::service::ServiceError;
use thiserror::Error;

/// Errors that can occur during packing operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PackError {
    /// The order is not open.
    #[error("Order not open: {0}")]
    NotFound(String),

    /// The item does not belong to the order.
    #[error("Item not found on order: {0}")]
    ItemNotFound(String),

    /// Completion needs every item packed.
    #[error("Order is not fully packed (status {0})")]
    NotFullyPacked(String),

    /// A completion countdown is already running for the order.
    #[error("Completion countdown already running")]
    CountdownRunning,

    /// No completion countdown is running for the order.
    #[error("No completion countdown running")]
    NoCountdown,

    /// The order is completed and read-only.
    #[error("Order already completed")]
    AlreadyCompleted,

    /// The order service failed; local state was restored.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for PackError {
    fn from(msg: String) -> Self {
        PackError::ActorCommunicationError(msg)
    }
}
