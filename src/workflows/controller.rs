// Shippit delivery workflow: one controller per delivery details page

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::status::{workflow_view, WorkflowAction, WorkflowView};
use super::store::DeliveryOrderStore;
use crate::api::{ApiError, DeliveryOps, DeliveryOrder};
use crate::interaction::{BusyFlag, Confirmation, Notice, Notifier, Severity};
use crate::observability::OperationTimer;

const LOAD_FAILED: &str = "Delivery order could not be loaded.";
const REFRESH_FAILED: &str = "Shippit Order was updated but its latest status could not be loaded.";

/// What the provider call behind a mutating action produced
#[derive(Debug)]
pub enum Mutation {
    /// Accepted; the canonical order has to be reloaded
    Mutated,
    /// Accepted and already applied to the local order
    Patched(DeliveryOrder),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The order as it stands after the action
    Completed(DeliveryOrder),
    /// The provider accepted the action but the reload failed
    RefreshFailed,
    /// Label url, `None` when the provider has none yet
    Document(Option<String>),
    Failed { message: &'static str },
    /// The user answered no at the confirmation gate
    Declined,
    /// Another action is still in flight
    Busy,
    /// The action is not offered for the current status
    NotPermitted,
}

impl ActionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. } | ActionOutcome::RefreshFailed)
    }
}

pub struct ShippitWorkflowController {
    tracking_id: String,
    delivery: Arc<dyn DeliveryOps>,
    confirmation: Arc<dyn Confirmation>,
    notifier: Arc<dyn Notifier>,
    store: DeliveryOrderStore,
    busy: BusyFlag,
}

impl std::fmt::Debug for ShippitWorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippitWorkflowController")
            .field("tracking_id", &self.tracking_id)
            .field("store", &self.store)
            .field("busy", &self.busy)
            .finish()
    }
}

impl ShippitWorkflowController {
    pub fn new(
        tracking_id: impl Into<String>,
        delivery: Arc<dyn DeliveryOps>,
        confirmation: Arc<dyn Confirmation>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            delivery,
            confirmation,
            notifier,
            store: DeliveryOrderStore::new(),
            busy: BusyFlag::new(),
        }
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn order(&self) -> Option<DeliveryOrder> {
        self.store.snapshot()
    }

    pub fn view(&self) -> WorkflowView {
        workflow_view(self.store.status())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Fetch the canonical order for this page
    pub async fn load(&self) -> ActionOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            return ActionOutcome::Busy;
        };

        match self.delivery.get_by_tracking(&self.tracking_id).await {
            Ok(order) => {
                self.store.replace(order.clone());
                info!(tracking_id = %self.tracking_id, status = ?order.status(), "Delivery order loaded");
                ActionOutcome::Completed(order)
            }
            Err(e) => {
                warn!(tracking_id = %self.tracking_id, error = %e, "Failed to load delivery order");
                self.notifier.notify(Notice::error(LOAD_FAILED));
                ActionOutcome::Failed { message: LOAD_FAILED }
            }
        }
    }

    pub async fn confirm_order(&self) -> ActionOutcome {
        self.perform(WorkflowAction::Confirm).await
    }

    pub async fn book_delivery(&self) -> ActionOutcome {
        self.perform(WorkflowAction::Book).await
    }

    pub async fn cancel_delivery(&self) -> ActionOutcome {
        self.perform(WorkflowAction::Cancel).await
    }

    pub async fn download_label(&self) -> ActionOutcome {
        self.perform(WorkflowAction::DownloadLabel).await
    }

    pub async fn download_booking_label(&self) -> ActionOutcome {
        self.perform(WorkflowAction::DownloadBookingLabel).await
    }

    /// Run one user action end to end.
    ///
    /// Busy check, status check and confirmation gate happen before anything
    /// is sent. Provider failures never escape: they become a notice and
    /// [`ActionOutcome::Failed`] with the loaded order untouched.
    pub async fn perform(&self, action: WorkflowAction) -> ActionOutcome {
        let Some(_guard) = self.busy.try_acquire() else {
            debug!(tracking_id = %self.tracking_id, %action, "Action rejected while another is in flight");
            return ActionOutcome::Busy;
        };

        if !self.view().permits(action) {
            debug!(tracking_id = %self.tracking_id, %action, status = ?self.store.status(), "Action not offered for status");
            return ActionOutcome::NotPermitted;
        }

        if let Some(prompt) = action.confirmation() {
            if !self.confirmation.confirm(&prompt).await {
                info!(tracking_id = %self.tracking_id, %action, "Action declined at confirmation");
                return ActionOutcome::Declined;
            }
        }

        let timer = OperationTimer::new(&format!("shippit_{action}"));
        let id = self.tracking_id.as_str();
        let outcome = match action {
            WorkflowAction::Confirm => {
                let mutation = match self.delivery.confirm(id).await {
                    Ok(()) => Mutation::Mutated,
                    Err(e) => Mutation::Failed(e),
                };
                self.settle(action, mutation).await
            }
            WorkflowAction::Book => {
                let mutation = match self.delivery.book(id).await {
                    Ok(()) => Mutation::Mutated,
                    Err(e) => Mutation::Failed(e),
                };
                self.settle(action, mutation).await
            }
            WorkflowAction::Cancel => {
                let mutation = match self.delivery.cancel(id).await {
                    Ok(()) => self.patch_cancelled(),
                    Err(e) => Mutation::Failed(e),
                };
                self.settle(action, mutation).await
            }
            WorkflowAction::DownloadLabel => {
                let result = self.delivery.label(id).await;
                self.document(action, result)
            }
            WorkflowAction::DownloadBookingLabel => {
                let result = self.delivery.booking_label(id).await;
                self.document(action, result)
            }
        };
        timer.finish();
        outcome
    }

    // Provider status lags behind a cancellation, so the local copy is patched instead of reloaded
    fn patch_cancelled(&self) -> Mutation {
        match self.store.mark_cancelled() {
            Ok(order) => Mutation::Patched(order),
            Err(e) => {
                warn!(tracking_id = %self.tracking_id, error = %e, "Local cancellation patch refused, reloading instead");
                Mutation::Mutated
            }
        }
    }

    async fn settle(&self, action: WorkflowAction, mutation: Mutation) -> ActionOutcome {
        match mutation {
            Mutation::Failed(e) => {
                warn!(tracking_id = %self.tracking_id, %action, error = %e, "Shippit action failed");
                let message = action.failure_message();
                self.notifier.notify(Notice::error(message));
                ActionOutcome::Failed { message }
            }
            Mutation::Patched(order) => {
                self.notify_success(action);
                ActionOutcome::Completed(order)
            }
            Mutation::Mutated => {
                self.notify_success(action);
                self.refresh(action).await
            }
        }
    }

    async fn refresh(&self, action: WorkflowAction) -> ActionOutcome {
        match self.delivery.get_by_tracking(&self.tracking_id).await {
            Ok(order) => {
                self.store.replace(order.clone());
                info!(tracking_id = %self.tracking_id, %action, status = ?order.status(), "Delivery order refreshed after action");
                ActionOutcome::Completed(order)
            }
            Err(e) => {
                warn!(tracking_id = %self.tracking_id, %action, error = %e, "Refresh after action failed");
                self.notifier.notify(Notice::new(Severity::Warning, REFRESH_FAILED));
                ActionOutcome::RefreshFailed
            }
        }
    }

    fn notify_success(&self, action: WorkflowAction) {
        info!(tracking_id = %self.tracking_id, %action, "Shippit action succeeded");
        if let Some(message) = action.success_message() {
            self.notifier.notify(Notice::success(message));
        }
    }

    fn document(&self, action: WorkflowAction, result: Result<Option<String>, ApiError>) -> ActionOutcome {
        match result {
            Ok(url) => {
                debug!(tracking_id = %self.tracking_id, %action, available = url.is_some(), "Label fetched");
                ActionOutcome::Document(url)
            }
            Err(e) => {
                warn!(tracking_id = %self.tracking_id, %action, error = %e, "Label download failed");
                let message = action.failure_message();
                self.notifier.notify(Notice::error(message));
                ActionOutcome::Failed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::delivery::MockDeliveryOps;
    use crate::api::{DeliveryStatus, DeliveryStatusKind, SalesOrder};
    use crate::interaction::confirmation::MockConfirmation;
    use crate::interaction::{AutoApprove, NoticeBoard};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const TRACKING_ID: &str = "PPYDTA5W8Q9";

    fn order(status: DeliveryStatusKind) -> DeliveryOrder {
        DeliveryOrder {
            id: 42,
            tracking_number: Some(TRACKING_ID.to_string()),
            sales_order: Some(SalesOrder {
                order_id: Some(1042),
                customer_name: "Tan Ah Kow".to_string(),
                customer_address: "10 Bayfront Avenue".to_string(),
                postal_code: "018956".to_string(),
                ..SalesOrder::default()
            }),
            delivery_mode: Some("STANDARD".to_string()),
            delivery_status: Some(DeliveryStatus {
                status,
                date: Some("18-10-2026".to_string()),
                timestamp: Some("10:42".to_string()),
            }),
            ..DeliveryOrder::default()
        }
    }

    fn api_failure() -> ApiError {
        ApiError::Status {
            endpoint: "http://localhost:3000/api/delivery/shippit".to_string(),
            status: 502,
            body: "Bad Gateway".to_string(),
        }
    }

    fn board() -> Arc<NoticeBoard> {
        Arc::new(NoticeBoard::new(Duration::from_secs(60)))
    }

    fn controller(delivery: impl DeliveryOps + 'static, notices: &Arc<NoticeBoard>) -> ShippitWorkflowController {
        ShippitWorkflowController::new(
            TRACKING_ID,
            Arc::new(delivery),
            Arc::new(AutoApprove),
            notices.clone(),
        )
    }

    /// Backend whose status moves forward on confirm/book, with an optional gate to hold calls in flight
    struct FakeBackend {
        order: Mutex<DeliveryOrder>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(status: DeliveryStatusKind) -> Self {
            Self {
                order: Mutex::new(order(status)),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(status: DeliveryStatusKind, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(status)
            }
        }

        async fn advance_to(&self, status: DeliveryStatusKind) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.order.lock().unwrap().delivery_status.as_mut().unwrap().status = status;
            Ok(())
        }
    }

    #[async_trait]
    impl DeliveryOps for FakeBackend {
        async fn get_by_tracking(&self, _tracking_id: &str) -> Result<DeliveryOrder, ApiError> {
            Ok(self.order.lock().unwrap().clone())
        }

        async fn confirm(&self, _tracking_id: &str) -> Result<(), ApiError> {
            self.advance_to(DeliveryStatusKind::DespatchInProgress).await
        }

        async fn book(&self, _tracking_id: &str) -> Result<(), ApiError> {
            self.advance_to(DeliveryStatusKind::ReadyForPickup).await
        }

        async fn cancel(&self, _tracking_id: &str) -> Result<(), ApiError> {
            // Provider keeps reporting the old status for a while
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn label(&self, _tracking_id: &str) -> Result<Option<String>, ApiError> {
            Ok(Some("https://labels.example.com/label.pdf".to_string()))
        }

        async fn booking_label(&self, _tracking_id: &str) -> Result<Option<String>, ApiError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_nothing_offered_before_load() {
        let notices = board();
        let controller = controller(FakeBackend::new(DeliveryStatusKind::OrderPlaced), &notices);

        assert_eq!(controller.view().active_step_index(), -1);
        assert_eq!(controller.confirm_order().await, ActionOutcome::NotPermitted);
    }

    #[tokio::test]
    async fn test_confirm_then_book_walks_the_steps() {
        let notices = board();
        let controller = controller(FakeBackend::new(DeliveryStatusKind::OrderPlaced), &notices);

        controller.load().await;
        assert_eq!(controller.view().active_step, Some(0));

        let outcome = controller.confirm_order().await;
        assert!(matches!(&outcome, ActionOutcome::Completed(o) if o.status() == Some(DeliveryStatusKind::DespatchInProgress)));
        assert_eq!(controller.view().active_step, Some(1));
        assert_eq!(
            notices.current().unwrap(),
            Notice::success("Shippit Order confirmed successfully.")
        );

        controller.book_delivery().await;
        assert_eq!(controller.view().active_step, Some(2));
        assert!(controller.view().permits(WorkflowAction::DownloadBookingLabel));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_failed_confirm_leaves_order_untouched() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        delivery
            .expect_get_by_tracking()
            .times(1)
            .returning(|_| Ok(order(DeliveryStatusKind::OrderPlaced)));
        delivery
            .expect_confirm()
            .times(2)
            .returning(|_| Err(api_failure()));
        let controller = controller(delivery, &notices);

        controller.load().await;
        let before = controller.order();

        let outcome = controller.confirm_order().await;
        assert_eq!(
            outcome,
            ActionOutcome::Failed { message: "Shippit Order could not be confirmed successfully." }
        );
        assert_eq!(controller.order(), before);
        assert!(!controller.is_busy());
        assert_eq!(notices.current().unwrap().severity, Severity::Error);

        // Still offered, so the user can retry
        assert!(controller.view().permits(WorkflowAction::Confirm));
        assert!(controller.confirm_order().await.is_failure());
    }

    #[tokio::test]
    async fn test_failed_book_and_cancel_keep_status() {
        for (status, action) in [
            (DeliveryStatusKind::DespatchInProgress, WorkflowAction::Book),
            (DeliveryStatusKind::OrderPlaced, WorkflowAction::Cancel),
        ] {
            let notices = board();
            let mut delivery = MockDeliveryOps::new();
            delivery
                .expect_get_by_tracking()
                .times(1)
                .returning(move |_| Ok(order(status)));
            delivery.expect_book().returning(|_| Err(api_failure()));
            delivery.expect_cancel().returning(|_| Err(api_failure()));
            let controller = controller(delivery, &notices);

            controller.load().await;
            let outcome = controller.perform(action).await;

            assert_eq!(outcome, ActionOutcome::Failed { message: action.failure_message() });
            assert_eq!(controller.order().unwrap().status(), Some(status));
            assert!(!controller.is_busy());
        }
    }

    #[tokio::test]
    async fn test_cancel_patches_only_status_without_reload() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        delivery
            .expect_get_by_tracking()
            .times(1)
            .returning(|_| Ok(order(DeliveryStatusKind::OrderPlaced)));
        delivery.expect_cancel().times(1).returning(|_| Ok(()));
        let controller = controller(delivery, &notices);

        controller.load().await;
        let before = controller.order().unwrap();

        let outcome = controller.cancel_delivery().await;

        let mut expected = before;
        expected.delivery_status.as_mut().unwrap().status = DeliveryStatusKind::Cancelled;
        assert_eq!(outcome, ActionOutcome::Completed(expected.clone()));
        assert_eq!(controller.order(), Some(expected));

        let view = controller.view();
        assert!(view.cancelled);
        assert_eq!(view.active_step_index(), -1);
        assert!(view.actions.is_empty());
        assert_eq!(
            notices.current().unwrap(),
            Notice::success("Shippit Order cancelled successfully.")
        );
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        delivery
            .expect_get_by_tracking()
            .times(1)
            .returning(|_| Ok(order(DeliveryStatusKind::OrderPlaced)));
        delivery.expect_cancel().times(0);
        let mut confirmation = MockConfirmation::new();
        confirmation
            .expect_confirm()
            .withf(|prompt| prompt.title == "Cancel Shippit Delivery")
            .times(1)
            .returning(|_| false);

        let controller = ShippitWorkflowController::new(
            TRACKING_ID,
            Arc::new(delivery),
            Arc::new(confirmation),
            notices.clone(),
        );
        controller.load().await;

        assert_eq!(controller.cancel_delivery().await, ActionOutcome::Declined);
        assert_eq!(controller.view().active_step, Some(0));
        assert!(notices.current().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_rejected_while_in_flight() {
        let notices = board();
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend::gated(DeliveryStatusKind::OrderPlaced, gate.clone()));
        let controller = ShippitWorkflowController::new(
            TRACKING_ID,
            backend.clone(),
            Arc::new(AutoApprove),
            notices.clone(),
        );
        controller.load().await;

        let first = controller.confirm_order();
        let second = async {
            tokio::task::yield_now().await;
            let outcome = controller.confirm_order().await;
            gate.notify_one();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, ActionOutcome::Completed(_)));
        assert_eq!(second, ActionOutcome::Busy);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_refresh_failure_after_success_is_reported() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        let mut loads = 0;
        delivery.expect_get_by_tracking().times(2).returning(move |_| {
            loads += 1;
            if loads == 1 {
                Ok(order(DeliveryStatusKind::DespatchInProgress))
            } else {
                Err(api_failure())
            }
        });
        delivery.expect_book().times(1).returning(|_| Ok(()));
        let controller = controller(delivery, &notices);

        controller.load().await;
        assert_eq!(controller.book_delivery().await, ActionOutcome::RefreshFailed);
        assert_eq!(notices.current().unwrap().severity, Severity::Warning);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_labels_are_side_effect_free() {
        let notices = board();
        let controller = controller(FakeBackend::new(DeliveryStatusKind::DespatchInProgress), &notices);
        controller.load().await;
        let before = controller.order();

        assert_eq!(
            controller.download_label().await,
            ActionOutcome::Document(Some("https://labels.example.com/label.pdf".to_string()))
        );
        assert_eq!(controller.order(), before);
        // Booking label belongs to later steps
        assert_eq!(controller.download_booking_label().await, ActionOutcome::NotPermitted);
    }

    #[tokio::test]
    async fn test_label_failure_posts_notice() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        delivery
            .expect_get_by_tracking()
            .returning(|_| Ok(order(DeliveryStatusKind::Untrackable)));
        delivery.expect_booking_label().times(1).returning(|_| Err(api_failure()));
        let controller = controller(delivery, &notices);

        controller.load().await;
        assert!(controller.download_booking_label().await.is_failure());
        assert_eq!(
            notices.current().unwrap(),
            Notice::error("Shippit booking label could not be retrieved.")
        );
    }

    #[tokio::test]
    async fn test_load_failure_posts_notice() {
        let notices = board();
        let mut delivery = MockDeliveryOps::new();
        delivery.expect_get_by_tracking().returning(|_| Err(api_failure()));
        let controller = controller(delivery, &notices);

        assert!(controller.load().await.is_failure());
        assert!(controller.order().is_none());
        assert_eq!(notices.current().unwrap().message, "Delivery order could not be loaded.");
    }
}
