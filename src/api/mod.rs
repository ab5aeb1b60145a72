// Portal backend service clients

pub mod delivery;
pub mod errors;
pub mod geocoding;
pub mod routing;
pub mod types;

pub use delivery::{DeliveryOps, DeliveryService};
pub use errors::ApiError;
pub use geocoding::{GeocodingOps, GeocodingService};
pub use routing::{RoutingOps, RoutingService};
pub use types::{Address, DeliveryOrder, DeliveryStatus, DeliveryStatusKind, OrderStatus, SalesOrder};
