//! Delivery-order lookup and Shippit provider actions

use async_trait::async_trait;
use tracing::debug;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::errors::ApiError;
use super::types::DeliveryOrder;
use crate::http::RateLimitedHttpClient;

/// Delivery backend operations, keyed by Shippit tracking id
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait DeliveryOps: Send + Sync {
    /// Canonical delivery order for a tracking id
    async fn get_by_tracking(&self, tracking_id: &str) -> Result<DeliveryOrder, ApiError>;

    async fn confirm(&self, tracking_id: &str) -> Result<(), ApiError>;

    async fn book(&self, tracking_id: &str) -> Result<(), ApiError>;

    async fn cancel(&self, tracking_id: &str) -> Result<(), ApiError>;

    /// Shipping label document url; `None` when Shippit has not produced one yet
    async fn label(&self, tracking_id: &str) -> Result<Option<String>, ApiError>;

    /// Booking label document url
    async fn booking_label(&self, tracking_id: &str) -> Result<Option<String>, ApiError>;
}

/// [`DeliveryOps`] over the portal REST API
#[derive(Debug, Clone)]
pub struct DeliveryService {
    client: RateLimitedHttpClient,
}

impl DeliveryService {
    pub fn new(client: RateLimitedHttpClient) -> Self {
        Self { client }
    }
}

fn document_url(raw: Option<String>) -> Option<String> {
    raw.map(|url| url.trim().to_string()).filter(|url| !url.is_empty())
}

#[async_trait]
impl DeliveryOps for DeliveryService {
    async fn get_by_tracking(&self, tracking_id: &str) -> Result<DeliveryOrder, ApiError> {
        debug!(tracking_id, "Fetching delivery order");
        self.client
            .get_json(&format!("delivery/tracking/{tracking_id}"))
            .await
    }

    async fn confirm(&self, tracking_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("delivery/shippit/confirm/{tracking_id}"))
            .await
    }

    async fn book(&self, tracking_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("delivery/shippit/book/{tracking_id}"))
            .await
    }

    async fn cancel(&self, tracking_id: &str) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("delivery/shippit/cancel/{tracking_id}"))
            .await
    }

    async fn label(&self, tracking_id: &str) -> Result<Option<String>, ApiError> {
        let raw: Option<String> = self
            .client
            .get_json(&format!("delivery/shippit/label/{tracking_id}"))
            .await?;
        Ok(document_url(raw))
    }

    async fn booking_label(&self, tracking_id: &str) -> Result<Option<String>, ApiError> {
        let raw: Option<String> = self
            .client
            .get_json(&format!("delivery/shippit/bookingLabel/{tracking_id}"))
            .await?;
        Ok(document_url(raw))
    }
}
