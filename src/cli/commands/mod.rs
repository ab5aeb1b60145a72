use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{DeliveryService, GeocodingService, RoutingService};
use crate::config::DeliveryConsoleConfig;
use crate::http::RateLimitedHttpClient;
use crate::interaction::{AutoApprove, Confirmation, TerminalConfirmation};

pub mod config;
pub mod delivery;
pub mod route;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Backend services for one CLI run, sharing a single rate-limited client
pub struct ConsoleContext {
    pub config: DeliveryConsoleConfig,
    client: RateLimitedHttpClient,
}

impl ConsoleContext {
    pub fn new(config: DeliveryConsoleConfig) -> Result<Self> {
        let client = RateLimitedHttpClient::new(&config.api)?;
        Ok(Self { config, client })
    }

    pub fn delivery(&self) -> Arc<DeliveryService> {
        Arc::new(DeliveryService::new(self.client.clone()))
    }

    pub fn routing(&self) -> Arc<RoutingService> {
        Arc::new(RoutingService::new(self.client.clone()))
    }

    pub fn geocoding(&self) -> Arc<GeocodingService> {
        Arc::new(GeocodingService::new(self.client.clone()))
    }

    pub fn delivery_notice_timeout(&self) -> Duration {
        Duration::from_millis(self.config.notices.delivery_timeout_ms)
    }

    pub fn planner_notice_timeout(&self) -> Duration {
        Duration::from_millis(self.config.notices.route_planner_timeout_ms)
    }

    /// Log backend usage for this run
    pub fn finish(&self) {
        self.client.metrics().log_stats();
    }
}

pub fn confirmation_gate(auto_approve: bool) -> Arc<dyn Confirmation> {
    if auto_approve {
        Arc::new(AutoApprove)
    } else {
        Arc::new(TerminalConfirmation)
    }
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("🚚 Delivery Console - Shippit workflow and route planning");
    println!();
    println!("Delivery workflow:");
    println!("  🔎 delivery-console show --id <tracking id>           # Where the delivery stands");
    println!("  ✅ delivery-console confirm --id <tracking id>        # Confirm a placed order");
    println!("  📦 delivery-console book --id <tracking id>           # Book a confirmed order");
    println!("  🛑 delivery-console cancel --id <tracking id>         # Cancel before confirmation");
    println!("  🏷️  delivery-console label --id <tracking id>          # Shippit label");
    println!("  🏷️  delivery-console booking-label --id <tracking id>  # Booking label");
    println!();
    println!("Route planning:");
    println!("  📍 delivery-console locate --postal-code <code>");
    println!("  🗺️  delivery-console plan --postal-code <code> --planner-id <id> [--date YYYY-MM-DD]");
    println!();
    println!("💡 Add --yes to skip confirmation prompts");
    Ok(())
}
