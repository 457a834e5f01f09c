//! # Pack Actor
//!
//! Holds the working copy of every order currently open for packing and runs
//! the packing state machine against it.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for
//!   [`PackOrder`] and the injected [`PackContext`]
//! - [`actions`] - [`PackAction`] / [`PackActionResult`]
//! - [`error`] - [`PackError`]
//! - [`new()`] - Factory function that creates the actor and its client
//!
//! ## Status transitions
//!
//! ```text
//!   Pending <──toggle──> Opened ──begin countdown──> (frozen) ──commit──> Completed
//!                           ^                           │
//!                           └──── cancel / failed commit┘
//! ```
//!
//! `Pending` and `Opened` are re-derived on every toggle. `Completed` is
//! terminal and only reachable through a commit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (actor, generic_client) = pack_actor::new(32);
//! tokio::spawn(actor.run(PackContext::new(service, session)));
//! let client = PackClient::new(generic_client, Duration::from_secs(30));
//!
//! client.open(OrderId(7)).await?;
//! client.toggle_item(OrderId(7), item).await?;
//! client.save_progress(OrderId(7)).await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::PackContext;
pub use error::*;

use crate::framework::{ResourceActor, ResourceClient};
use crate::model::PackOrder;

/// Creates a new pack actor and its generic client.
pub fn new(buffer_size: usize) -> (ResourceActor<PackOrder>, ResourceClient<PackOrder>) {
    ResourceActor::new(buffer_size)
}
