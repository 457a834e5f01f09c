//! Error types for order service calls.

use thiserror::Error;

/// Errors that can occur while talking to the order service.
///
/// The engine treats every variant the same way (abort and roll back); the
/// split exists for logs and for callers that want a better message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// The request never got a response (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The token is missing, expired or not allowed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The server answered but refused the request.
    #[error("Order service error (HTTP {status}): {message}")]
    Business { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Invalid response from order service: {0}")]
    Decode(String),
}
