use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::api::Address;
use crate::cli::commands::{Command, ConsoleContext};
use crate::interaction::ConsoleNotifier;
use crate::planning::{
    route_rows, validate_service_date, OriginOutcome, RouteOutcome, RoutePlanner, RouteRow,
    ROUTE_COLUMNS,
};

pub struct LocateCommand {
    pub location: String,
}

impl LocateCommand {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub async fn run(&self, context: &ConsoleContext) -> Result<()> {
        let planner = planner(context);
        resolve(&planner, &self.location).await.map(|_| ())
    }
}

pub struct PlanCommand {
    pub date: Option<NaiveDate>,
    pub location: String,
    pub planner_id: String,
}

impl PlanCommand {
    pub fn new(location: impl Into<String>, planner_id: impl Into<String>) -> Self {
        Self {
            date: None,
            location: location.into(),
            planner_id: planner_id.into(),
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    /// Service date, today when none was given
    pub fn service_date(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }

    /// Input checks that need no backend
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate> {
        let date = self.service_date(today);
        validate_service_date(date, today)?;
        if self.planner_id.trim().is_empty() {
            return Err(anyhow!("Planner id must not be empty"));
        }
        Ok(date)
    }

    pub async fn run(&self, context: &ConsoleContext) -> Result<()> {
        let today = Local::now().date_naive();
        let date = self.validate(today)?;

        let planner = planner(context);
        resolve(&planner, &self.location).await?;

        println!("🗺️  Planning route for deliveries on {}", date.format("%d-%m-%Y"));
        match planner.plan_route(date, today, &self.planner_id).await? {
            RouteOutcome::Planned(stops) => {
                let rows = route_rows(&stops);
                println!();
                println!("{}", format_row(&ROUTE_COLUMNS.map(String::from)));
                for row in &rows {
                    println!(
                        "{}",
                        format_row(&[
                            row.sequence.clone(),
                            row.sales_order_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                            row.status.to_string(),
                            row.address.clone(),
                        ])
                    );
                }
                let hints = open_hints(&rows);
                if !hints.is_empty() {
                    println!();
                    println!("💡 Open a stop with:");
                    for hint in hints {
                        println!("   {hint}");
                    }
                }
                Ok(())
            }
            RouteOutcome::NoRoute => Err(anyhow!("No deliveries to route on {date}")),
            RouteOutcome::Failed => Err(anyhow!("Route planning request failed")),
            RouteOutcome::Busy => Err(anyhow!("Route planning already in progress")),
        }
    }
}

impl Command for LocateCommand {
    async fn execute(&self) -> Result<()> {
        let context = ConsoleContext::new(crate::config::config()?.clone())?;
        let result = self.run(&context).await;
        context.finish();
        result
    }
}

impl Command for PlanCommand {
    async fn execute(&self) -> Result<()> {
        // Bad input never reaches the backend
        self.validate(Local::now().date_naive())?;
        let context = ConsoleContext::new(crate::config::config()?.clone())?;
        let result = self.run(&context).await;
        context.finish();
        result
    }
}

fn planner(context: &ConsoleContext) -> RoutePlanner {
    RoutePlanner::new(
        context.geocoding(),
        context.routing(),
        Arc::new(ConsoleNotifier::new(context.planner_notice_timeout())),
    )
}

async fn resolve(planner: &RoutePlanner, location: &str) -> Result<Address> {
    print!("🔍 Looking up starting location '{}'... ", location.trim());
    let _ = std::io::Write::flush(&mut std::io::stdout());
    let outcome = planner.resolve_origin(location).await;
    println!();
    match outcome? {
        OriginOutcome::Resolved(address) => {
            println!("📍 Your starting address is: {}", address.address);
            Ok(address)
        }
        OriginOutcome::InvalidLocation => Err(anyhow!("No address found for '{}'", location.trim())),
        OriginOutcome::Failed => Err(anyhow!("Starting location lookup failed")),
        OriginOutcome::Busy => Err(anyhow!("Starting location lookup already in progress")),
    }
}

/// `show` invocations for the stops that carry a tracking number
fn open_hints(rows: &[RouteRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| {
            row.tracking_number
                .as_deref()
                .map(|tracking| format!("{}: delivery-console show --id {tracking}", row.sequence))
        })
        .collect()
}

fn format_row(cells: &[String; 4]) -> String {
    format!("{:<10} {:<16} {:<20} {}", cells[0], cells[1], cells[2], cells[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_service_date_defaults_to_today() {
        let command = PlanCommand::new("018956", "7");
        assert_eq!(command.validate(day(18)).unwrap(), day(18));
    }

    #[test]
    fn test_past_service_date_rejected() {
        let command = PlanCommand::new("018956", "7").with_date(Some(day(17)));
        let err = command.validate(day(18)).unwrap_err();
        assert!(err.to_string().contains("before today"));
    }

    #[test]
    fn test_open_hints_use_tracking_numbers() {
        let row = |sequence: &str, tracking: Option<&str>| RouteRow {
            sequence: sequence.to_string(),
            sales_order_id: None,
            status: "Shipped",
            address: String::new(),
            delivery_id: 1,
            tracking_number: tracking.map(String::from),
        };

        let hints = open_hints(&[row("Stop 1", Some("PPYDTA5W8Q9")), row("Stop 2", None)]);
        assert_eq!(hints, vec!["Stop 1: delivery-console show --id PPYDTA5W8Q9"]);
    }

    #[test]
    fn test_blank_planner_rejected() {
        let command = PlanCommand::new("018956", " ").with_date(Some(day(20)));
        assert!(command.validate(day(18)).is_err());
    }
}
