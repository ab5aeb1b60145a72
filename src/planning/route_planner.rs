// Route planner: starting location first, then a solved route for one service date

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{Address, DeliveryOrder, GeocodingOps, RoutingOps};
use crate::interaction::{BusyFlag, Notice, Notifier};
use crate::observability::OperationTimer;

pub const LOCATION_INVALID: &str = "Starting location invalid, please try again!";
pub const LOCATION_SET: &str = "Starting location set successfully.";
pub const LOCATION_LOOKUP_FAILED: &str = "Starting location could not be looked up, please try again!";
pub const ROUTE_FAILED: &str = "Route planning failed, please try again!";
pub const ROUTE_PLANNED: &str = "Route planning is successfully.";
pub const ROUTE_UNAVAILABLE: &str = "Route planning service unavailable, please try again!";

/// Input problems caught before anything is sent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanningError {
    #[error("Service date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("Starting location must not be empty")]
    BlankLocation,
    #[error("Set a starting location before planning a route")]
    NoOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OriginOutcome {
    Resolved(Address),
    /// Geocoder found nothing for the text
    InvalidLocation,
    Failed,
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Stops in visiting order, numbered from 1
    Planned(Vec<DeliveryOrder>),
    /// The router came back without any stops
    NoRoute,
    Failed,
    Busy,
}

/// Service dates start today
pub fn validate_service_date(date: NaiveDate, today: NaiveDate) -> Result<(), PlanningError> {
    if date < today {
        return Err(PlanningError::DateInPast { date, today });
    }
    Ok(())
}

/// Drop the origin and return-to-origin markers and number what is left.
///
/// Anything with fewer than three elements has no stops.
pub fn number_stops(raw: Vec<DeliveryOrder>) -> Vec<DeliveryOrder> {
    let len = raw.len();
    if len <= 2 {
        return Vec::new();
    }
    raw.into_iter()
        .skip(1)
        .take(len - 2)
        .enumerate()
        .map(|(index, mut stop)| {
            stop.stop_order = Some(index as u32 + 1);
            stop
        })
        .collect()
}

/// Resolved starting location and the text it was looked up with
#[derive(Debug, Clone, PartialEq)]
struct StartingLocation {
    query: String,
    address: Address,
}

pub struct RoutePlanner {
    geocoder: Arc<dyn GeocodingOps>,
    router: Arc<dyn RoutingOps>,
    notifier: Arc<dyn Notifier>,
    origin: Mutex<Option<StartingLocation>>,
    busy: BusyFlag,
}

impl std::fmt::Debug for RoutePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("origin", &self.origin())
            .field("busy", &self.busy)
            .finish()
    }
}

impl RoutePlanner {
    pub fn new(
        geocoder: Arc<dyn GeocodingOps>,
        router: Arc<dyn RoutingOps>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            geocoder,
            router,
            notifier,
            origin: Mutex::new(None),
            busy: BusyFlag::new(),
        }
    }

    /// Current starting address, if one has been resolved
    pub fn origin(&self) -> Option<Address> {
        self.starting_location().map(|origin| origin.address)
    }

    /// Text the current origin was resolved from; this is what the router is sent
    pub fn origin_query(&self) -> Option<String> {
        self.starting_location().map(|origin| origin.query)
    }

    fn starting_location(&self) -> Option<StartingLocation> {
        self.origin.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_origin(&self, origin: Option<StartingLocation>) {
        *self.origin.lock().unwrap_or_else(PoisonError::into_inner) = origin;
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Geocode the starting location. The first match becomes the origin.
    pub async fn resolve_origin(&self, text: &str) -> Result<OriginOutcome, PlanningError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(PlanningError::BlankLocation);
        }
        let Some(_guard) = self.busy.try_acquire() else {
            return Ok(OriginOutcome::Busy);
        };

        let timer = OperationTimer::new("resolve_origin");
        let outcome = match self.geocoder.resolve(query).await {
            Ok(matches) => match matches.into_iter().next() {
                Some(address) => {
                    info!(query, address = %address.address, "Starting location set");
                    self.set_origin(Some(StartingLocation {
                        query: query.to_string(),
                        address: address.clone(),
                    }));
                    self.notifier.notify(Notice::success(LOCATION_SET));
                    OriginOutcome::Resolved(address)
                }
                None => {
                    info!(query, "No address matched starting location");
                    self.set_origin(None);
                    self.notifier.notify(Notice::error(LOCATION_INVALID));
                    OriginOutcome::InvalidLocation
                }
            },
            Err(e) => {
                warn!(query, error = %e, "Starting location lookup failed");
                self.notifier.notify(Notice::error(LOCATION_LOOKUP_FAILED));
                OriginOutcome::Failed
            }
        };
        timer.finish();
        Ok(outcome)
    }

    /// Request the route for `date`, judged against `today`
    pub async fn plan_route(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        planner_id: &str,
    ) -> Result<RouteOutcome, PlanningError> {
        validate_service_date(date, today)?;
        let origin = self.starting_location().ok_or(PlanningError::NoOrigin)?;
        let Some(_guard) = self.busy.try_acquire() else {
            return Ok(RouteOutcome::Busy);
        };

        let timer = OperationTimer::new("plan_route");
        let outcome = match self.router.plan(date, planner_id, &origin.query).await {
            Ok(raw) => {
                let returned = raw.len();
                let stops = number_stops(raw);
                if stops.is_empty() {
                    warn!(%date, planner_id, returned, "Route came back without stops");
                    self.notifier.notify(Notice::error(ROUTE_FAILED));
                    RouteOutcome::NoRoute
                } else {
                    info!(%date, planner_id, stops = stops.len(), "Route planned");
                    self.notifier.notify(Notice::success(ROUTE_PLANNED));
                    RouteOutcome::Planned(stops)
                }
            }
            Err(e) => {
                warn!(%date, planner_id, error = %e, "Route planning request failed");
                self.notifier.notify(Notice::error(ROUTE_UNAVAILABLE));
                RouteOutcome::Failed
            }
        };
        timer.finish();
        Ok(outcome)
    }
}
