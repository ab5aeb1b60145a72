//! Address lookup for the route planner's starting point

use async_trait::async_trait;
use serde::Serialize;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::errors::ApiError;
use super::types::Address;
use crate::http::RateLimitedHttpClient;

/// Resolves free text or a postal code to candidate addresses.
///
/// An empty vector means "not found" and is not an error.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait GeocodingOps: Send + Sync {
    async fn resolve(&self, address_text: &str) -> Result<Vec<Address>, ApiError>;
}

#[derive(Debug, Serialize)]
struct LocationRequest<'a> {
    address: &'a str,
}

/// [`GeocodingOps`] over the portal REST API, cached per query text
#[derive(Debug, Clone)]
pub struct GeocodingService {
    client: RateLimitedHttpClient,
}

impl GeocodingService {
    pub fn new(client: RateLimitedHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GeocodingOps for GeocodingService {
    async fn resolve(&self, address_text: &str) -> Result<Vec<Address>, ApiError> {
        let query = address_text.trim();
        self.client
            .post_json_cached(
                format!("geocode:{}", query.to_lowercase()),
                "delivery/currentLocation",
                &LocationRequest { address: query },
            )
            .await
    }
}
