// Delivery lifecycle workflow: status mapping, lifecycle tracking, page controller

pub mod controller;
pub mod lifecycle;
pub mod status;
pub mod store;

pub use controller::{ActionOutcome, Mutation, ShippitWorkflowController};
pub use lifecycle::{LifecycleTracker, TransitionError};
pub use status::{workflow_view, DeliveryStep, WorkflowAction, WorkflowView, DELIVERY_STEPS};
pub use store::DeliveryOrderStore;
