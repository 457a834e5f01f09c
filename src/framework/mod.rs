//! Generic actor plumbing for resources that are loaded from a backend,
//! mutated through typed actions, and closed when their screen goes away.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by an actor
//! - [`ResourceActor`] - Generic actor that owns every open entity
//! - [`ResourceClient`] - Typed handle for sending requests to the actor
//! - [`FrameworkError`] - Plumbing failures (closed channel, unknown id, entity error)
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning a full actor.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
