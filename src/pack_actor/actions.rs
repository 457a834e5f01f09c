//! Custom actions for the pack actor.
//!
//! These are the engine operations that mutate a [`PackOrder`](crate::model::PackOrder),
//! handled by [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action).

use crate::model::{CountdownId, ItemRef, PackStatus};

/// Operations on an open order.
#[derive(Debug, Clone)]
pub enum PackAction {
    /// Flip one item's packed flag.
    ToggleItem(ItemRef),
    /// Flush packed flags with a status capped at `Opened`.
    SaveProgress,
    /// Freeze the items ahead of an automatic completion.
    BeginCountdown,
    /// Unfreeze the items; nothing is sent. Ignored unless the id is current.
    CancelCountdown(CountdownId),
    /// Persist the order as completed. Ignored unless the id is current.
    CommitCompletion(CountdownId),
}

/// Results from PackActions - variants match 1:1 with PackAction
#[derive(Debug, Clone, PartialEq)]
pub enum PackActionResult {
    ToggleItem(Toggled),
    SaveProgress(PackStatus),
    BeginCountdown(CountdownId),
    CancelCountdown(PackStatus),
    CommitCompletion(PackStatus),
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Toggled {
    /// False when the order was frozen and nothing changed.
    pub changed: bool,
    /// Stored status after the toggle.
    pub status: PackStatus,
}
