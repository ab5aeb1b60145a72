//! Route table rows

use serde::Serialize;

use crate::api::{DeliveryOrder, DeliveryStatusKind, OrderStatus};

pub const ROUTE_COLUMNS: [&str; 4] = ["Sequence", "Sales Order ID", "Delivery Status", "Address"];

/// Status label for one route row. Cancellation wins over the sales order's own status.
pub fn route_row_label(
    order_status: Option<OrderStatus>,
    delivery_status: Option<DeliveryStatusKind>,
) -> &'static str {
    if delivery_status == Some(DeliveryStatusKind::Cancelled) {
        return "Cancelled";
    }
    match order_status {
        Some(OrderStatus::ReadyForDelivery) => "Delivery Scheduled",
        Some(OrderStatus::Shipped) => "Shipped",
        _ => "Completed",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    pub sequence: String,
    pub sales_order_id: Option<u64>,
    pub status: &'static str,
    pub address: String,
    /// Delivery to open from this row
    pub delivery_id: u64,
    /// Shippit tracking number, what `show --id` takes
    pub tracking_number: Option<String>,
}

impl RouteRow {
    pub fn from_stop(stop: &DeliveryOrder) -> Self {
        let sales_order = stop.sales_order.as_ref();
        Self {
            sequence: stop
                .stop_order
                .map_or_else(|| "Stop -".to_string(), |n| format!("Stop {n}")),
            sales_order_id: sales_order.and_then(|order| order.order_id),
            status: route_row_label(stop.order_status(), stop.status()),
            address: sales_order
                .map(|order| order.customer_address.clone())
                .unwrap_or_default(),
            delivery_id: stop.id,
            tracking_number: stop.tracking_number.clone(),
        }
    }
}

pub fn route_rows(stops: &[DeliveryOrder]) -> Vec<RouteRow> {
    stops.iter().map(RouteRow::from_stop).collect()
}
