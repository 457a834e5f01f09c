//! [`ActorEntity`] implementation for [`PackOrder`].
//!
//! This is where the packing state machine lives:
//!
//! - toggles re-derive the stored status, capped at `Opened`
//! - a partial save never stores `Completed`
//! - `Completed` is reached only by committing a running countdown; a failed
//!   commit rolls the status back to `Opened` and unfreezes the items
//!
//! Every service failure leaves the order as it was before the request and is
//! returned to the caller as a [`PackError`].

use super::actions::{PackAction, PackActionResult, Toggled};
use super::error::PackError;
use crate::framework::ActorEntity;
use crate::model::{CountdownId, ItemRef, OrderId, PackOrder, PackStatus, UpdateOrderRequest};
use crate::service::{OrderService, Session};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies injected into the pack actor at `run()` time.
#[derive(Clone)]
pub struct PackContext {
    pub service: Arc<dyn OrderService>,
    pub session: Session,
    /// Shared by every order, so countdown ids survive close and reopen.
    countdowns: Arc<AtomicU64>,
}

impl PackContext {
    pub fn new(service: Arc<dyn OrderService>, session: Session) -> Self {
        Self {
            service,
            session,
            countdowns: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_countdown(&self) -> CountdownId {
        CountdownId(self.countdowns.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl ActorEntity for PackOrder {
    type Id = OrderId;
    type Action = PackAction;
    type ActionResult = PackActionResult;
    type Context = PackContext;
    type Error = PackError;

    async fn load(id: &OrderId, ctx: &PackContext) -> Result<Self, PackError> {
        let data = ctx.service.fetch_order(&ctx.session, *id).await?;
        let order = PackOrder::from_wire(*id, data);
        debug!(order_id = %id, status = %order.status, packages = order.packages.len(),
            additional = order.additional_items.len(), "Order loaded");
        Ok(order)
    }

    async fn handle_action(&mut self, action: PackAction, ctx: &PackContext) -> Result<PackActionResult, PackError> {
        match action {
            PackAction::ToggleItem(item) => self.toggle_item(&item).map(PackActionResult::ToggleItem),
            PackAction::SaveProgress => self.save_progress(ctx).await.map(PackActionResult::SaveProgress),
            PackAction::BeginCountdown => self.begin_countdown(ctx).map(PackActionResult::BeginCountdown),
            PackAction::CancelCountdown(countdown) => self
                .cancel_countdown(countdown)
                .map(PackActionResult::CancelCountdown),
            PackAction::CommitCompletion(countdown) => self
                .commit_completion(countdown, ctx)
                .await
                .map(PackActionResult::CommitCompletion),
        }
    }

    async fn on_close(&self, _ctx: &PackContext) {
        if self.dirty {
            warn!(order_id = %self.id, "Closing order with unsaved changes");
        }
    }
}

impl PackOrder {
    fn toggle_item(&mut self, item: &ItemRef) -> Result<Toggled, PackError> {
        if self.is_frozen() {
            debug!(order_id = %self.id, %item, "Toggle ignored, order frozen");
            return Ok(Toggled {
                changed: false,
                status: self.status,
            });
        }

        let flag = self
            .packed_flag_mut(item)
            .ok_or_else(|| PackError::ItemNotFound(item.to_string()))?;
        *flag = !*flag;
        let packed = *flag;

        self.dirty = true;
        self.status = self.derive_status().capped();
        debug!(order_id = %self.id, %item, packed, status = %self.status, "Toggled");
        Ok(Toggled {
            changed: true,
            status: self.status,
        })
    }

    async fn save_progress(&mut self, ctx: &PackContext) -> Result<PackStatus, PackError> {
        if self.is_completed() {
            return Err(PackError::AlreadyCompleted);
        }
        if self.countdown_running() {
            return Err(PackError::CountdownRunning);
        }

        let status = self.derive_status().capped();
        let request = UpdateOrderRequest::new(self, status, false);
        ctx.service.update_order(&ctx.session, &request).await?;

        self.status = status;
        self.dirty = false;
        info!(order_id = %self.id, %status, "Progress saved");
        Ok(status)
    }

    fn begin_countdown(&mut self, ctx: &PackContext) -> Result<CountdownId, PackError> {
        if self.is_completed() {
            return Err(PackError::AlreadyCompleted);
        }
        if self.countdown_running() {
            return Err(PackError::CountdownRunning);
        }
        let derived = self.derive_status();
        if derived != PackStatus::Completed {
            return Err(PackError::NotFullyPacked(derived.to_string()));
        }

        let countdown = ctx.next_countdown();
        self.countdown = Some(countdown);
        info!(order_id = %self.id, %countdown, "Completion countdown started");
        Ok(countdown)
    }

    /// Checks that `countdown` is the one currently running.
    fn current_countdown(&self, countdown: CountdownId) -> Result<(), PackError> {
        match self.countdown {
            Some(current) if current == countdown => Ok(()),
            Some(current) => {
                debug!(order_id = %self.id, %countdown, %current, "Stale countdown ignored");
                Err(PackError::NoCountdown)
            }
            None if self.is_completed() => Err(PackError::AlreadyCompleted),
            None => Err(PackError::NoCountdown),
        }
    }

    fn cancel_countdown(&mut self, countdown: CountdownId) -> Result<PackStatus, PackError> {
        self.current_countdown(countdown)?;

        self.countdown = None;
        info!(order_id = %self.id, %countdown, status = %self.status, "Completion countdown cancelled");
        Ok(self.status)
    }

    async fn commit_completion(&mut self, countdown: CountdownId, ctx: &PackContext) -> Result<PackStatus, PackError> {
        self.current_countdown(countdown)?;

        // Optimistic: frozen as completed while the update is in flight
        self.countdown = None;
        self.status = PackStatus::Completed;

        let request = UpdateOrderRequest::new(self, PackStatus::Completed, true);
        if let Err(e) = ctx.service.update_order(&ctx.session, &request).await {
            self.status = PackStatus::Opened;
            warn!(order_id = %self.id, error = %e, "Completion failed, status rolled back");
            return Err(e.into());
        }
        self.dirty = false;
        info!(order_id = %self.id, "Order completed");

        // Best-effort: the order stays completed whatever happens here
        if let Err(e) = ctx.service.update_distributed_target(&ctx.session, self.id).await {
            warn!(order_id = %self.id, error = %e, "Distributed target update failed");
        }

        Ok(PackStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdditionalItem, Package, PackageItem};
    use crate::service::{MockOrderService, RecordedCall, ServiceError};

    fn context(mock: &MockOrderService) -> PackContext {
        PackContext::new(Arc::new(mock.clone()), Session::new("token-1", "sw"))
    }

    fn order() -> PackOrder {
        PackOrder::new(
            OrderId(21),
            vec![Package::new(
                1,
                "Tools",
                1,
                vec![PackageItem::new(1, "Hoe", 1.0, 4.0), PackageItem::new(2, "Rake", 1.0, 6.0)],
            )],
            vec![],
        )
    }

    const A: ItemRef = ItemRef::Package { package_id: 1, item_id: 1 };
    const B: ItemRef = ItemRef::Package { package_id: 1, item_id: 2 };

    async fn act(order: &mut PackOrder, action: PackAction, ctx: &PackContext) -> Result<PackActionResult, PackError> {
        order.handle_action(action, ctx).await
    }

    async fn begin(order: &mut PackOrder, ctx: &PackContext) -> CountdownId {
        match act(order, PackAction::BeginCountdown, ctx).await.unwrap() {
            PackActionResult::BeginCountdown(countdown) => countdown,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_toggle_rederives_status_capped() {
        let mock = MockOrderService::new();
        let ctx = context(&mock);
        let mut order = order();
        assert_eq!(order.status, PackStatus::Pending);

        let result = act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        assert_eq!(
            result,
            PackActionResult::ToggleItem(Toggled {
                changed: true,
                status: PackStatus::Opened
            })
        );
        assert!(order.dirty);

        act(&mut order, PackAction::ToggleItem(B), &ctx).await.unwrap();
        assert_eq!(order.derive_status(), PackStatus::Completed);
        assert_eq!(order.status, PackStatus::Opened);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_unknown_item() {
        let ctx = context(&MockOrderService::new());
        let mut order = order();
        let err = act(&mut order, PackAction::ToggleItem(ItemRef::Additional(1)), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, PackError::ItemNotFound("additional item 1".into()));
    }

    #[tokio::test]
    async fn test_save_progress_caps_and_clears_dirty() {
        let mock = MockOrderService::new();
        mock.expect_update().return_ok();
        let ctx = context(&mock);
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        act(&mut order, PackAction::ToggleItem(B), &ctx).await.unwrap();

        let result = act(&mut order, PackAction::SaveProgress, &ctx).await.unwrap();
        assert_eq!(result, PackActionResult::SaveProgress(PackStatus::Opened));
        assert!(!order.dirty);

        let updates = mock.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, PackStatus::Opened);
        assert_eq!(updates[0].is_complete, 0);
        assert_eq!(mock.sessions()[0], Session::new("token-1", "sw"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_save_progress_failure_keeps_local_state() {
        let mock = MockOrderService::new();
        mock.expect_update()
            .return_err(ServiceError::Auth("expired".into()));
        let ctx = context(&mock);
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();

        let err = act(&mut order, PackAction::SaveProgress, &ctx).await.unwrap_err();
        assert_eq!(err, PackError::Service(ServiceError::Auth("expired".into())));
        assert!(order.dirty);
        assert!(order.packages[0].items[0].packed);
        assert_eq!(order.status, PackStatus::Opened);
    }

    #[tokio::test]
    async fn test_countdown_requires_everything_packed() {
        let ctx = context(&MockOrderService::new());
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();

        let err = act(&mut order, PackAction::BeginCountdown, &ctx).await.unwrap_err();
        assert_eq!(err, PackError::NotFullyPacked("Opened".into()));
        assert!(!order.countdown_running());
    }

    #[tokio::test]
    async fn test_countdown_freezes_toggles_until_cancelled() {
        let mock = MockOrderService::new();
        let ctx = context(&mock);
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        act(&mut order, PackAction::ToggleItem(B), &ctx).await.unwrap();

        let countdown = begin(&mut order, &ctx).await;
        assert_eq!(
            act(&mut order, PackAction::BeginCountdown, &ctx).await.unwrap_err(),
            PackError::CountdownRunning
        );
        assert_eq!(
            act(&mut order, PackAction::SaveProgress, &ctx).await.unwrap_err(),
            PackError::CountdownRunning
        );

        let frozen = act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        assert_eq!(
            frozen,
            PackActionResult::ToggleItem(Toggled {
                changed: false,
                status: PackStatus::Opened
            })
        );
        assert!(order.packages[0].items[0].packed);

        let result = act(&mut order, PackAction::CancelCountdown(countdown), &ctx).await.unwrap();
        assert_eq!(result, PackActionResult::CancelCountdown(PackStatus::Opened));
        assert!(!order.is_frozen());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_commit_completion_success() {
        let mock = MockOrderService::new();
        mock.expect_update().return_ok();
        mock.expect_distributed_target().return_ok();
        let ctx = context(&mock);
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        act(&mut order, PackAction::ToggleItem(B), &ctx).await.unwrap();
        let countdown = begin(&mut order, &ctx).await;

        let result = act(&mut order, PackAction::CommitCompletion(countdown), &ctx).await.unwrap();
        assert_eq!(result, PackActionResult::CommitCompletion(PackStatus::Completed));
        assert!(order.is_completed());
        assert!(!order.dirty);

        let calls = mock.calls();
        assert!(matches!(&calls[0], RecordedCall::Update(u) if u.status == PackStatus::Completed && u.is_complete == 1));
        assert_eq!(calls[1], RecordedCall::DistributedTarget(OrderId(21)));
        mock.verify();

        // Completed is terminal
        let toggled = act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        assert_eq!(
            toggled,
            PackActionResult::ToggleItem(Toggled {
                changed: false,
                status: PackStatus::Completed
            })
        );
        assert_eq!(
            act(&mut order, PackAction::SaveProgress, &ctx).await.unwrap_err(),
            PackError::AlreadyCompleted
        );
        assert_eq!(
            act(&mut order, PackAction::CancelCountdown(countdown), &ctx).await.unwrap_err(),
            PackError::AlreadyCompleted
        );
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back() {
        let mock = MockOrderService::new();
        mock.expect_update()
            .return_err(ServiceError::Transport("offline".into()));
        let ctx = context(&mock);
        let mut order = order();
        act(&mut order, PackAction::ToggleItem(A), &ctx).await.unwrap();
        act(&mut order, PackAction::ToggleItem(B), &ctx).await.unwrap();
        let countdown = begin(&mut order, &ctx).await;

        let err = act(&mut order, PackAction::CommitCompletion(countdown), &ctx).await.unwrap_err();
        assert_eq!(err, PackError::Service(ServiceError::Transport("offline".into())));
        assert_eq!(order.status, PackStatus::Opened);
        assert!(!order.is_frozen());
        assert!(order.dirty);

        // The user can start over with a fresh countdown
        let retry = begin(&mut order, &ctx).await;
        assert_ne!(retry, countdown);
        mock.verify();
    }

    #[tokio::test]
    async fn test_distributed_target_failure_is_swallowed() {
        let mock = MockOrderService::new();
        mock.expect_update().return_ok();
        mock.expect_distributed_target()
            .return_err(ServiceError::Business {
                status: 500,
                message: "boom".into(),
            });
        let ctx = context(&mock);
        let mut order = PackOrder::new(
            OrderId(4),
            vec![],
            vec![AdditionalItem::new(1, "Tarp", 1.0, 9.0).packed(true)],
        );
        let countdown = begin(&mut order, &ctx).await;

        let result = act(&mut order, PackAction::CommitCompletion(countdown), &ctx).await.unwrap();
        assert_eq!(result, PackActionResult::CommitCompletion(PackStatus::Completed));
        assert!(order.is_completed());
        mock.verify();
    }

    #[tokio::test]
    async fn test_commit_without_countdown_is_rejected() {
        let mock = MockOrderService::new();
        let ctx = context(&mock);
        let mut order = PackOrder::new(
            OrderId(4),
            vec![],
            vec![AdditionalItem::new(1, "Tarp", 1.0, 9.0).packed(true)],
        );

        let err = act(&mut order, PackAction::CommitCompletion(CountdownId(1)), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, PackError::NoCountdown);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_countdown_is_ignored() {
        let mock = MockOrderService::new();
        mock.expect_update()
            .return_err(ServiceError::Transport("offline".into()));
        let ctx = context(&mock);
        let mut order = PackOrder::new(
            OrderId(4),
            vec![],
            vec![AdditionalItem::new(1, "Tarp", 1.0, 9.0).packed(true)],
        );

        let first = begin(&mut order, &ctx).await;
        act(&mut order, PackAction::CommitCompletion(first), &ctx)
            .await
            .unwrap_err();
        let second = begin(&mut order, &ctx).await;

        assert_eq!(
            act(&mut order, PackAction::CancelCountdown(first), &ctx).await.unwrap_err(),
            PackError::NoCountdown
        );
        assert_eq!(
            act(&mut order, PackAction::CommitCompletion(first), &ctx).await.unwrap_err(),
            PackError::NoCountdown
        );
        assert_eq!(order.countdown, Some(second));
        assert_eq!(mock.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_countdown_ids_are_not_reused_across_orders() {
        let ctx = context(&MockOrderService::new());
        let packed = || vec![AdditionalItem::new(1, "Tarp", 1.0, 9.0).packed(true)];

        let mut first = PackOrder::new(OrderId(4), vec![], packed());
        let mut reopened = PackOrder::new(OrderId(4), vec![], packed());
        let a = begin(&mut first, &ctx).await;
        let b = begin(&mut reopened, &ctx).await;
        assert_ne!(a, b);
    }
}
