//! Delivery status → step indicator and permitted actions.
//!
//! [`workflow_view`] decides both the active step and the offered actions.

use std::collections::BTreeSet;
use std::fmt;

use crate::api::DeliveryStatusKind;
use crate::interaction::ConfirmationPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStep {
    pub label: &'static str,
    pub status: DeliveryStatusKind,
}

/// The four-step progress indicator, in lifecycle order
pub const DELIVERY_STEPS: [DeliveryStep; 4] = [
    DeliveryStep {
        label: "Order placed",
        status: DeliveryStatusKind::OrderPlaced,
    },
    DeliveryStep {
        label: "Packing order",
        status: DeliveryStatusKind::DespatchInProgress,
    },
    DeliveryStep {
        label: "Booked for delivery",
        status: DeliveryStatusKind::ReadyForPickup,
    },
    DeliveryStep {
        label: "Out for delivery",
        status: DeliveryStatusKind::Untrackable,
    },
];

/// User action on a single delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkflowAction {
    Confirm,
    Book,
    Cancel,
    DownloadLabel,
    DownloadBookingLabel,
}

impl WorkflowAction {
    /// Whether the action changes the delivery's status on the provider
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            WorkflowAction::Confirm | WorkflowAction::Book | WorkflowAction::Cancel
        )
    }

    /// Gate shown before the action runs; label downloads are ungated
    pub fn confirmation(&self) -> Option<ConfirmationPrompt> {
        match self {
            WorkflowAction::Confirm => Some(ConfirmationPrompt {
                title: "Confirm Shippit Delivery",
                body: "Are you sure you want to confirm the delivery order? This action cannot be reversed.",
            }),
            WorkflowAction::Book => Some(ConfirmationPrompt {
                title: "Book Shippit Order",
                body: "Are you sure you want to book the Shippit order? This action cannot be reversed.",
            }),
            WorkflowAction::Cancel => Some(ConfirmationPrompt {
                title: "Cancel Shippit Delivery",
                body: "Are you sure you want to cancel the delivery order? This action cannot be reversed.",
            }),
            WorkflowAction::DownloadLabel | WorkflowAction::DownloadBookingLabel => None,
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            WorkflowAction::Confirm => "Confirm Shippit Order",
            WorkflowAction::Book => "Book Shippit Delivery",
            WorkflowAction::Cancel => "Cancel Order",
            WorkflowAction::DownloadLabel => "Get Shippit Label",
            WorkflowAction::DownloadBookingLabel => "Get Booking Label",
        }
    }

    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            WorkflowAction::Confirm => Some("Shippit Order confirmed successfully."),
            WorkflowAction::Book => Some("Shippit Order booked successfully."),
            WorkflowAction::Cancel => Some("Shippit Order cancelled successfully."),
            WorkflowAction::DownloadLabel | WorkflowAction::DownloadBookingLabel => None,
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            WorkflowAction::Confirm => "Shippit Order could not be confirmed successfully.",
            WorkflowAction::Book => "Shippit Order could not be booked successfully.",
            WorkflowAction::Cancel => "Shippit Order could not be cancelled successfully.",
            WorkflowAction::DownloadLabel => "Shippit label could not be retrieved.",
            WorkflowAction::DownloadBookingLabel => "Shippit booking label could not be retrieved.",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowAction::Confirm => "confirm",
            WorkflowAction::Book => "book",
            WorkflowAction::Cancel => "cancel",
            WorkflowAction::DownloadLabel => "label",
            WorkflowAction::DownloadBookingLabel => "booking-label",
        };
        f.write_str(name)
    }
}

/// Derived UI state for one delivery
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowView {
    /// Position in [`DELIVERY_STEPS`]; `None` hides the indicator
    pub active_step: Option<usize>,
    pub actions: BTreeSet<WorkflowAction>,
    pub cancelled: bool,
}

impl WorkflowView {
    /// Step index with -1 for "no active step"
    pub fn active_step_index(&self) -> isize {
        self.active_step.map_or(-1, |step| step as isize)
    }

    pub fn permits(&self, action: WorkflowAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Step and actions for a delivery status; `None` means not fetched yet
pub fn workflow_view(status: Option<DeliveryStatusKind>) -> WorkflowView {
    use WorkflowAction::*;

    let (active_step, actions): (Option<usize>, &[WorkflowAction]) = match status {
        None => (None, &[][..]),
        Some(DeliveryStatusKind::OrderPlaced) => (Some(0), &[Confirm, Cancel][..]),
        Some(DeliveryStatusKind::DespatchInProgress) => (Some(1), &[DownloadLabel, Book][..]),
        Some(DeliveryStatusKind::ReadyForPickup) => (Some(2), &[DownloadBookingLabel][..]),
        Some(DeliveryStatusKind::Untrackable) => (Some(3), &[DownloadBookingLabel][..]),
        Some(DeliveryStatusKind::Cancelled) => (None, &[][..]),
        Some(DeliveryStatusKind::Unknown) => (None, &[][..]),
    };

    WorkflowView {
        active_step,
        actions: actions.iter().copied().collect(),
        cancelled: status == Some(DeliveryStatusKind::Cancelled),
    }
}
