//! # Generic Messages
//!
//! Requests exchanged between [`ResourceClient`](super::ResourceClient) and
//! [`ResourceActor`](super::ResourceActor).

use super::entity::ActorEntity;
use super::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants follow the life of a screen-bound resource:
///
/// - **Open**: load (or reload) the entity from its source.
/// - **Get**: snapshot of the current working copy.
/// - **Action**: run a custom [`ActorEntity::Action`] against the working copy.
/// - **Close**: discard the working copy.
///
/// The enum is generic over `T: ActorEntity`, so an action meant for one
/// resource type cannot be delivered to another.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Open {
        id: T::Id,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Close {
        id: T::Id,
        respond_to: Response<bool>,
    },
}
