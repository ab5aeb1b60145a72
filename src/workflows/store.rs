use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use super::lifecycle::{LifecycleTracker, TransitionError};
use crate::api::{DeliveryOrder, DeliveryStatusKind};

#[derive(Debug, Default)]
struct StoreState {
    order: Option<DeliveryOrder>,
    lifecycle: LifecycleTracker,
}

/// Current delivery order of one details page.
///
/// The backend is the source of truth: [`DeliveryOrderStore::replace`] always
/// takes what the server sent, even when it does not fit the lifecycle (that
/// is logged). The only local mutation is the cancellation patch.
#[derive(Debug, Default)]
pub struct DeliveryOrderStore {
    state: Mutex<StoreState>,
}

impl DeliveryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Option<DeliveryOrder> {
        self.lock().order.clone()
    }

    /// Status of the loaded order; `None` until the first fetch lands
    pub fn status(&self) -> Option<DeliveryStatusKind> {
        self.lock().order.as_ref().and_then(DeliveryOrder::status)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().order.is_some()
    }

    /// Install a freshly fetched canonical order
    pub fn replace(&self, order: DeliveryOrder) {
        let mut state = self.lock();
        if let Some(status) = order.status() {
            if let Err(e) = state.lifecycle.observe(status) {
                warn!(order_id = order.id, error = %e, "Backend reported an out-of-sequence delivery status");
            }
        }
        debug!(order_id = order.id, status = ?order.status(), "Delivery order refreshed");
        state.order = Some(order);
    }

    /// Patch the loaded order's status to `cancelled`, leaving every other field alone
    pub fn mark_cancelled(&self) -> Result<DeliveryOrder, TransitionError> {
        let mut state = self.lock();
        let StoreState { order, lifecycle } = &mut *state;
        let order = order.as_mut().ok_or(TransitionError::NothingLoaded)?;

        let from = order.status().unwrap_or(DeliveryStatusKind::Unknown);
        if from != DeliveryStatusKind::OrderPlaced {
            return Err(TransitionError::InvalidTransition {
                from,
                to: DeliveryStatusKind::Cancelled,
            });
        }
        lifecycle.observe(DeliveryStatusKind::Cancelled)?;

        if let Some(delivery_status) = order.delivery_status.as_mut() {
            delivery_status.status = DeliveryStatusKind::Cancelled;
        }
        Ok(order.clone())
    }
}
