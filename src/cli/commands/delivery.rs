use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::Instrument;

use crate::api::DeliveryOrder;
use crate::cli::commands::{confirmation_gate, Command, ConsoleContext};
use crate::config::ShippitConfig;
use crate::interaction::{AutoApprove, ConsoleNotifier};
use crate::telemetry::create_delivery_span;
use crate::workflows::{ActionOutcome, ShippitWorkflowController, WorkflowAction, WorkflowView, DELIVERY_STEPS};

pub struct ShowCommand {
    pub tracking_id: String,
}

impl ShowCommand {
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
        }
    }

    pub async fn run(&self, context: &ConsoleContext) -> Result<()> {
        let notifier = Arc::new(ConsoleNotifier::new(context.delivery_notice_timeout()));
        let controller = ShippitWorkflowController::new(
            self.tracking_id.as_str(),
            context.delivery(),
            Arc::new(AutoApprove),
            notifier,
        );

        print!("🔄 Loading delivery {}... ", self.tracking_id);
        flush_stdout();
        match controller.load().await {
            ActionOutcome::Completed(order) => {
                println!("✅");
                println!();
                render_delivery(&order, &controller.view(), &context.config.shippit);
                Ok(())
            }
            _ => Err(anyhow!("Delivery {} could not be loaded", self.tracking_id)),
        }
    }
}

/// One Shippit action against a delivery, gated by confirmation unless `--yes`
pub struct ActionCommand {
    pub tracking_id: String,
    pub action: WorkflowAction,
    pub auto_approve: bool,
}

impl ActionCommand {
    pub fn new(tracking_id: impl Into<String>, action: WorkflowAction) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            action,
            auto_approve: false,
        }
    }

    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    pub async fn run(&self, context: &ConsoleContext) -> Result<()> {
        let notifier = Arc::new(ConsoleNotifier::new(context.delivery_notice_timeout()));
        let controller = ShippitWorkflowController::new(
            self.tracking_id.as_str(),
            context.delivery(),
            confirmation_gate(self.auto_approve),
            notifier,
        );

        if !matches!(controller.load().await, ActionOutcome::Completed(_)) {
            return Err(anyhow!("Delivery {} could not be loaded", self.tracking_id));
        }

        println!("🚚 {} for delivery {}", self.action.button_label(), self.tracking_id);
        match controller.perform(self.action).await {
            ActionOutcome::Completed(order) => {
                println!();
                render_delivery(&order, &controller.view(), &context.config.shippit);
                Ok(())
            }
            ActionOutcome::Document(Some(url)) => {
                println!("📄 {url}");
                Ok(())
            }
            ActionOutcome::Document(None) => {
                println!("📭 No label available for this delivery yet");
                Ok(())
            }
            ActionOutcome::Declined => {
                println!("🚫 Nothing was sent");
                Ok(())
            }
            ActionOutcome::NotPermitted => {
                let view = controller.view();
                let status = controller
                    .order()
                    .and_then(|order| order.status())
                    .map_or_else(|| "unknown".to_string(), |status| status.to_string());
                println!("⚠️  '{}' is not available while the delivery is {status}", self.action);
                print_available_actions(&view);
                Err(anyhow!("Action '{}' not available for status {status}", self.action))
            }
            ActionOutcome::Busy => Err(anyhow!("Another action is still in flight")),
            ActionOutcome::Failed { message } => Err(anyhow!(message)),
            ActionOutcome::RefreshFailed => {
                Err(anyhow!("Action went through but the delivery could not be reloaded"))
            }
        }
    }
}

impl Command for ActionCommand {
    async fn execute(&self) -> Result<()> {
        let context = ConsoleContext::new(crate::config::config()?.clone())?;
        let span = create_delivery_span(&self.action.to_string(), Some(self.tracking_id.as_str()), None);
        let result = self.run(&context).instrument(span).await;
        context.finish();
        result
    }
}

impl Command for ShowCommand {
    async fn execute(&self) -> Result<()> {
        let context = ConsoleContext::new(crate::config::config()?.clone())?;
        let span = create_delivery_span("show", Some(self.tracking_id.as_str()), None);
        let result = self.run(&context).instrument(span).await;
        context.finish();
        result
    }
}

fn flush_stdout() {
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

fn print_available_actions(view: &WorkflowView) {
    if view.actions.is_empty() {
        println!("   No actions available");
        return;
    }
    println!("   Available:");
    for action in &view.actions {
        println!("   → delivery-console {action} --id <tracking id>   # {}", action.button_label());
    }
}

pub fn render_delivery(order: &DeliveryOrder, view: &WorkflowView, shippit: &ShippitConfig) {
    println!("📦 DELIVERY #{}", order.id);
    println!("────────────────");
    if view.cancelled {
        println!("🛑 Delivery Cancelled");
    } else {
        render_steps(order, view);
    }
    println!();

    if let Some(sales_order) = &order.sales_order {
        println!("🏠 DELIVERY ADDRESS:");
        println!("   Name: {}", sales_order.customer_name);
        println!("   Address: {}", sales_order.customer_address);
        println!("   Country: Singapore");
        println!("   Postal code: {}", sales_order.postal_code);
        println!();
    }

    println!("📋 DELIVERY DETAILS:");
    println!("   Mode: {}", order.delivery_mode.as_deref().unwrap_or("-"));
    println!(
        "   Estimated delivery: {}",
        order.formatted_delivery_date().unwrap_or_else(|| "-".to_string())
    );
    match &order.tracking_number {
        Some(tracking) => {
            println!("   Tracking number: {tracking}");
            println!("   🔗 Track Order: {}", shippit.tracking_url(tracking));
        }
        None => println!("   Tracking number: -"),
    }
    println!();
    print_available_actions(view);
}

fn render_steps(order: &DeliveryOrder, view: &WorkflowView) {
    let stamp = order
        .delivery_status
        .as_ref()
        .map(|status| {
            [status.date.as_deref(), status.timestamp.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    for (position, step) in DELIVERY_STEPS.iter().enumerate() {
        match view.active_step {
            Some(active) if position < active => println!("   ✅ {}", step.label),
            Some(active) if position == active && !stamp.is_empty() => {
                println!("   🔵 {}  ({stamp})", step.label)
            }
            Some(active) if position == active => println!("   🔵 {}", step.label),
            _ => println!("   ⚪ {}", step.label),
        }
    }
}
