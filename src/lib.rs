// Delivery Console Library - Shippit delivery workflow and route planning
// This exposes the core components for testing and integration

pub mod api;
pub mod cli;
pub mod config;
pub mod http;
pub mod interaction;
pub mod observability;
pub mod planning;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use api::{
    Address, ApiError, DeliveryOps, DeliveryOrder, DeliveryService, DeliveryStatusKind, GeocodingOps,
    GeocodingService, OrderStatus, RoutingOps, RoutingService,
};
pub use config::{config, DeliveryConsoleConfig};
pub use http::RateLimitedHttpClient;
pub use interaction::{BusyFlag, Confirmation, ConsoleNotifier, Notice, NoticeBoard, Notifier, Severity};
pub use observability::{create_workflow_span, ApiMetrics, OperationTimer};
pub use planning::{route_row_label, OriginOutcome, PlanningError, RouteOutcome, RoutePlanner};
pub use telemetry::{create_delivery_span, generate_correlation_id, init_telemetry};
pub use workflows::{workflow_view, ActionOutcome, ShippitWorkflowController, WorkflowAction, WorkflowView};
