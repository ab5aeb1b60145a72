use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Explicit `null` decodes like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lifecycle state of a delivery as reported by Shippit.
///
/// Anything the portal does not know decodes to [`DeliveryStatusKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatusKind {
    OrderPlaced,
    DespatchInProgress,
    ReadyForPickup,
    Untrackable,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeliveryStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatusKind::OrderPlaced => "order_placed",
            DeliveryStatusKind::DespatchInProgress => "despatch_in_progress",
            DeliveryStatusKind::ReadyForPickup => "ready_for_pickup",
            DeliveryStatusKind::Untrackable => "untrackable",
            DeliveryStatusKind::Cancelled => "cancelled",
            DeliveryStatusKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeliveryStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub status: DeliveryStatusKind,
    pub date: Option<String>,
    pub timestamp: Option<String>,
}

/// Status of the sales order behind a delivery, distinct from the delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Paid,
    Preparing,
    Prepared,
    ReadyForDelivery,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalesOrder {
    pub order_id: Option<u64>,
    pub order_status: Option<OrderStatus>,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryOrder {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(rename = "shippitTrackingNum")]
    pub tracking_number: Option<String>,
    /// Route-planning payloads call this `order`
    #[serde(alias = "order")]
    pub sales_order: Option<SalesOrder>,
    pub delivery_mode: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub delivery_status: Option<DeliveryStatus>,
    /// Position in a planned route, never sent by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_order: Option<u32>,
}

impl DeliveryOrder {
    pub fn status(&self) -> Option<DeliveryStatusKind> {
        self.delivery_status.as_ref().map(|s| s.status)
    }

    pub fn order_status(&self) -> Option<OrderStatus> {
        self.sales_order.as_ref().and_then(|o| o.order_status)
    }

    /// Estimated delivery date as DD-MM-YYYY
    pub fn formatted_delivery_date(&self) -> Option<String> {
        self.delivery_date.map(|d| d.format("%d-%m-%Y").to_string())
    }
}

/// Geocoded address as returned by the location lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "ADDRESS")]
    pub address: String,
    #[serde(rename = "POSTAL", default)]
    pub postal: Option<String>,
    #[serde(rename = "LATITUDE", default)]
    pub latitude: Option<String>,
    #[serde(rename = "LONGITUDE", default)]
    pub longitude: Option<String>,
}
