//! Completion countdown.
//!
//! A running countdown owns a timer task that commits the order when the
//! deadline passes. Commit and cancel carry the [`CountdownId`] handed out
//! when the countdown began; the actor ignores any id but the current one.
//! So the timer and a cancelling user can never both win, and a handle left
//! over from an earlier countdown cannot touch a later one.

use super::pack_client::PackClient;
use crate::model::{CountdownId, OrderId, PackStatus};
use crate::pack_actor::PackError;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Handle to a running completion countdown.
///
/// Dropping the handle before the deadline cancels the countdown.
pub struct CompletionCountdown {
    order_id: OrderId,
    id: CountdownId,
    client: PackClient,
    deadline: Instant,
    task: Option<JoinHandle<Result<PackStatus, PackError>>>,
}

impl CompletionCountdown {
    pub(crate) fn start(client: PackClient, order_id: OrderId, id: CountdownId, duration: Duration) -> Self {
        let deadline = Instant::now() + duration;
        let timer_client = client.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            info!(%order_id, countdown = %id, "Countdown elapsed, committing completion");
            timer_client.commit_completion(order_id, id).await
        });

        Self {
            order_id,
            id,
            client,
            deadline,
            task: Some(task),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn id(&self) -> CountdownId {
        self.id
    }

    /// Time left before the order is committed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// The timer has fired and the commit has returned.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Stop the countdown and unfreeze the order.
    ///
    /// Fails with [`PackError::AlreadyCompleted`] when the commit won the race,
    /// and with [`PackError::NoCountdown`] when this countdown already ended.
    pub async fn cancel(mut self) -> Result<PackStatus, PackError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        debug!(order_id = %self.order_id, countdown = %self.id, "Cancelling countdown");
        self.client.cancel_countdown(self.order_id, self.id).await
    }

    /// Wait for the deadline and return the outcome of the commit.
    ///
    /// Cancel-safe: if this future is dropped the countdown keeps running and
    /// can still be cancelled through the handle.
    pub async fn wait(&mut self) -> Result<PackStatus, PackError> {
        let task = self.task.as_mut().ok_or(PackError::NoCountdown)?;
        let outcome = task
            .await
            .map_err(|e| PackError::ActorCommunicationError(e.to_string()));
        self.task = None;
        outcome?
    }
}

impl Drop for CompletionCountdown {
    fn drop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if task.is_finished() {
            return;
        }
        task.abort();
        match self.client.notify_cancel(self.order_id, self.id) {
            Ok(()) => debug!(order_id = %self.order_id, "Countdown dropped, cancel sent"),
            Err(e) => warn!(order_id = %self.order_id, error = %e, "Countdown dropped, cancel not delivered"),
        }
    }
}
