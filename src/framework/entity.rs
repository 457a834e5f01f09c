//! # ActorEntity Trait
//!
//! The contract a resource must satisfy to be managed by [`ResourceActor`](super::ResourceActor).
//!
//! Unlike a classic CRUD store, entities here are never created locally: they are
//! *loaded* from an external service when a screen opens them, mutated through
//! resource-specific actions, and discarded on close. The backend remains the
//! source of truth; the actor only holds the working copy.
//!
//! # Async & Context
//! Hooks are `#[async_trait]` so they can call the backend. The `Context` type is
//! injected into every hook at `run()` time ("late binding"), which keeps
//! construction free of dependencies and lets tests substitute mocks.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity, as the backend knows it.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Enum representing resource-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One error enum covers every action of the entity, so clients match on a
    /// single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the entity from wherever it lives.
    ///
    /// Called on every `Open`; re-opening an id replaces the working copy.
    async fn load(id: &Self::Id, ctx: &Self::Context) -> Result<Self, Self::Error>;

    /// Handle a resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;

    /// Called right before the working copy is discarded.
    async fn on_close(&self, _ctx: &Self::Context) {}
}
