// Route planning: starting location, solved route, route table

pub mod display;
pub mod route_planner;

pub use display::{route_row_label, route_rows, RouteRow, ROUTE_COLUMNS};
pub use route_planner::{
    number_stops, validate_service_date, OriginOutcome, PlanningError, RouteOutcome, RoutePlanner,
};
