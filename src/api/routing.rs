//! Route-planning backend

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::errors::ApiError;
use super::types::DeliveryOrder;
use crate::http::RateLimitedHttpClient;

/// Solves the visiting order for a day's deliveries.
///
/// The returned sequence starts with the origin and ends with the
/// return-to-origin marker.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait RoutingOps: Send + Sync {
    async fn plan(
        &self,
        date: NaiveDate,
        planner_id: &str,
        origin: &str,
    ) -> Result<Vec<DeliveryOrder>, ApiError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoutePlanRequest<'a> {
    date: NaiveDate,
    user_id: &'a str,
    address: &'a str,
}

/// [`RoutingOps`] over the portal REST API
#[derive(Debug, Clone)]
pub struct RoutingService {
    client: RateLimitedHttpClient,
}

impl RoutingService {
    pub fn new(client: RateLimitedHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoutingOps for RoutingService {
    async fn plan(
        &self,
        date: NaiveDate,
        planner_id: &str,
        origin: &str,
    ) -> Result<Vec<DeliveryOrder>, ApiError> {
        debug!(%date, planner_id, "Requesting planned route");
        let request = RoutePlanRequest {
            date,
            user_id: planner_id,
            address: origin,
        };
        self.client.post_json("delivery/routePlanning", &request).await
    }
}
