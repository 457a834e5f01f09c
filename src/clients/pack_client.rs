//! # Pack Client
//!
//! High-level API over the pack actor. Wraps a `ResourceClient<PackOrder>`
//! and turns generic action results back into typed values and [`PackError`]s.

use super::actor_client::ActorClient;
use super::countdown::CompletionCountdown;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{CountdownId, ItemRef, OrderId, PackOrder, PackStatus};
use crate::pack_actor::{PackAction, PackActionResult, PackError, Toggled};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default length of the completion countdown.
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(30);

/// Client for interacting with the pack actor.
#[derive(Clone)]
pub struct PackClient {
    inner: ResourceClient<PackOrder>,
    countdown: Duration,
}

impl PackClient {
    pub fn new(inner: ResourceClient<PackOrder>, countdown: Duration) -> Self {
        Self { inner, countdown }
    }

    /// Length of the countdowns this client starts.
    pub fn countdown_duration(&self) -> Duration {
        self.countdown
    }

    /// Fetch the order from the service and make it the working copy.
    ///
    /// Opening an order that is already open discards its unsaved toggles.
    #[instrument(skip(self))]
    pub async fn open(&self, id: OrderId) -> Result<PackOrder, PackError> {
        debug!("Sending request");
        let order = self.inner.open(id).await.map_err(Self::map_error)?;
        info!(status = %order.status, "Order opened");
        Ok(order)
    }

    /// Status derived from the current packed flags, uncapped.
    #[instrument(skip(self))]
    pub async fn derive_status(&self, id: OrderId) -> Result<PackStatus, PackError> {
        let order = self
            .get(id)
            .await?
            .ok_or_else(|| PackError::NotFound(id.to_string()))?;
        Ok(order.derive_status())
    }

    #[instrument(skip(self))]
    pub async fn toggle_item(&self, id: OrderId, item: ItemRef) -> Result<Toggled, PackError> {
        match self.perform(id, PackAction::ToggleItem(item)).await? {
            PackActionResult::ToggleItem(toggled) => Ok(toggled),
            other => Err(Self::unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn save_progress(&self, id: OrderId) -> Result<PackStatus, PackError> {
        match self.perform(id, PackAction::SaveProgress).await? {
            PackActionResult::SaveProgress(status) => Ok(status),
            other => Err(Self::unexpected(other)),
        }
    }

    /// Freeze the order and start the completion timer.
    ///
    /// When the timer elapses the order is committed. Cancel through the
    /// returned handle; dropping the handle also cancels.
    #[instrument(skip(self))]
    pub async fn begin_completion_countdown(&self, id: OrderId) -> Result<CompletionCountdown, PackError> {
        match self.perform(id, PackAction::BeginCountdown).await? {
            PackActionResult::BeginCountdown(countdown) => {
                info!(%countdown, seconds = self.countdown.as_secs(), "Countdown started");
                Ok(CompletionCountdown::start(self.clone(), id, countdown, self.countdown))
            }
            other => Err(Self::unexpected(other)),
        }
    }

    /// Persist the order as completed. `countdown` must be the one running.
    #[instrument(skip(self))]
    pub async fn commit_completion(&self, id: OrderId, countdown: CountdownId) -> Result<PackStatus, PackError> {
        match self.perform(id, PackAction::CommitCompletion(countdown)).await? {
            PackActionResult::CommitCompletion(status) => Ok(status),
            other => Err(Self::unexpected(other)),
        }
    }

    pub(crate) async fn cancel_countdown(&self, id: OrderId, countdown: CountdownId) -> Result<PackStatus, PackError> {
        match self.perform(id, PackAction::CancelCountdown(countdown)).await? {
            PackActionResult::CancelCountdown(status) => Ok(status),
            other => Err(Self::unexpected(other)),
        }
    }

    /// Fire-and-forget cancel, for synchronous cleanup paths.
    pub(crate) fn notify_cancel(&self, id: OrderId, countdown: CountdownId) -> Result<(), PackError> {
        self.inner
            .notify(id, PackAction::CancelCountdown(countdown))
            .map_err(Self::map_error)
    }

    async fn perform(&self, id: OrderId, action: PackAction) -> Result<PackActionResult, PackError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    fn unexpected(result: PackActionResult) -> PackError {
        PackError::ActorCommunicationError(format!("Unexpected action result: {:?}", result))
    }
}

#[async_trait]
impl ActorClient<PackOrder> for PackClient {
    type Error = PackError;

    fn inner(&self) -> &ResourceClient<PackOrder> {
        &self.inner
    }

    /// Entity errors come back as the [`PackError`] the actor raised.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => PackError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<PackError>() {
                Ok(err) => *err,
                Err(other) => PackError::ActorCommunicationError(other.to_string()),
            },
            other => PackError::ActorCommunicationError(other.to_string()),
        }
    }
}
