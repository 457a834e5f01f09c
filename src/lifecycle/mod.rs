//! Runtime orchestration and lifecycle management.
//!
//! - [`PackSystem`] - starts the pack actor with its service context and shuts it down
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod pack_system;
pub mod tracing;

pub use pack_system::*;
pub use tracing::*;
