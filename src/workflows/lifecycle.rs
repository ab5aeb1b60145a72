// Delivery lifecycle tracking
// Statuses only move forward; `cancelled` is reachable from `order_placed` alone and absorbs everything after it

use statig::prelude::*;
use thiserror::Error;

use crate::api::DeliveryStatusKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Observed(DeliveryStatusKind),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Delivery status cannot move from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatusKind,
        to: DeliveryStatusKind,
    },
    #[error("No delivery order loaded")]
    NothingLoaded,
}

fn rank(status: DeliveryStatusKind) -> Option<u8> {
    match status {
        DeliveryStatusKind::OrderPlaced => Some(0),
        DeliveryStatusKind::DespatchInProgress => Some(1),
        DeliveryStatusKind::ReadyForPickup => Some(2),
        DeliveryStatusKind::Untrackable => Some(3),
        DeliveryStatusKind::Cancelled | DeliveryStatusKind::Unknown => None,
    }
}

fn state_for(status: DeliveryStatusKind) -> Option<State> {
    match status {
        DeliveryStatusKind::OrderPlaced => Some(State::order_placed()),
        DeliveryStatusKind::DespatchInProgress => Some(State::despatch_in_progress()),
        DeliveryStatusKind::ReadyForPickup => Some(State::ready_for_pickup()),
        DeliveryStatusKind::Untrackable => Some(State::untrackable()),
        DeliveryStatusKind::Cancelled => Some(State::cancelled()),
        DeliveryStatusKind::Unknown => None,
    }
}

/// Statuses accepted so far; the state machine's context
#[derive(Debug, Default)]
pub struct DeliveryLifecycle {
    current: Option<DeliveryStatusKind>,
}

impl DeliveryLifecycle {
    fn enter(&mut self, status: DeliveryStatusKind) -> Outcome<State> {
        match state_for(status) {
            Some(state) => {
                self.current = Some(status);
                Transition(state)
            }
            None => Handled,
        }
    }

    /// Move forward along the step sequence, ignore anything else
    fn advance(&mut self, from: DeliveryStatusKind, event: &LifecycleEvent) -> Outcome<State> {
        let LifecycleEvent::Observed(to) = *event;
        match (rank(from), rank(to)) {
            (Some(current), Some(next)) if next > current => self.enter(to),
            _ => Handled,
        }
    }
}

#[state_machine(initial = "State::unobserved()")]
impl DeliveryLifecycle {
    #[state]
    fn unobserved(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        let LifecycleEvent::Observed(status) = *event;
        self.enter(status)
    }

    #[state]
    fn order_placed(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Observed(DeliveryStatusKind::Cancelled) => {
                self.enter(DeliveryStatusKind::Cancelled)
            }
            _ => self.advance(DeliveryStatusKind::OrderPlaced, event),
        }
    }

    #[state]
    fn despatch_in_progress(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.advance(DeliveryStatusKind::DespatchInProgress, event)
    }

    #[state]
    fn ready_for_pickup(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.advance(DeliveryStatusKind::ReadyForPickup, event)
    }

    #[state]
    fn untrackable(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        self.advance(DeliveryStatusKind::Untrackable, event)
    }

    #[state]
    fn cancelled(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        let _ = event;
        Handled
    }
}

/// Follows the statuses seen for one delivery and reports the ones that break the lifecycle
pub struct LifecycleTracker {
    machine: StateMachine<DeliveryLifecycle>,
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LifecycleTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleTracker")
            .field("current", &self.current())
            .finish()
    }
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self {
            machine: DeliveryLifecycle::default().state_machine(),
        }
    }

    /// Last status accepted by the lifecycle, `None` before the first observation
    pub fn current(&self) -> Option<DeliveryStatusKind> {
        self.machine.inner().current
    }

    /// Whether `to` would be accepted from the current state
    pub fn permits(&self, to: DeliveryStatusKind) -> bool {
        match self.current() {
            None => to != DeliveryStatusKind::Unknown,
            Some(from) if from == to => true,
            Some(DeliveryStatusKind::OrderPlaced) if to == DeliveryStatusKind::Cancelled => true,
            Some(from) => matches!((rank(from), rank(to)), (Some(a), Some(b)) if b > a),
        }
    }

    /// Feed a status into the lifecycle.
    ///
    /// Re-observing the current status is fine. Anything the lifecycle does
    /// not allow leaves the tracker where it was and comes back as an error.
    pub fn observe(&mut self, status: DeliveryStatusKind) -> Result<(), TransitionError> {
        let before = self.current();
        self.machine.handle(&LifecycleEvent::Observed(status));
        let after = self.current();

        if after == Some(status) {
            return Ok(());
        }

        match before {
            Some(from) => Err(TransitionError::InvalidTransition { from, to: status }),
            None => Err(TransitionError::InvalidTransition {
                from: DeliveryStatusKind::Unknown,
                to: status,
            }),
        }
    }
}
