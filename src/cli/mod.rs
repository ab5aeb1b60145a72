use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "delivery-console")]
#[command(about = "Shippit delivery workflow and route planning for the admin portal")]
#[command(long_about = "Walks a delivery through its Shippit lifecycle (confirm, book, cancel, labels) \
                       and plans delivery routes from a starting location. Start with \
                       'delivery-console show --id <tracking id>' to see where a delivery stands.")]
pub struct Cli {
    /// Skip confirmation prompts before irreversible actions
    #[arg(short = 'y', long, global = true, help = "Auto-approve confirmation prompts")]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the delivery's progress, address and details
    Show {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Confirm a placed order with Shippit
    Confirm {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Book a confirmed order for delivery
    Book {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Cancel an order that has not been confirmed yet
    Cancel {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Get the Shippit label of a confirmed order
    Label {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Get the booking label of a booked order
    BookingLabel {
        #[arg(long, help = "Shippit tracking id of the delivery")]
        id: String,
    },
    /// Look up a starting location for route planning
    Locate {
        #[arg(long, help = "Postal code or address of the starting location")]
        postal_code: String,
    },
    /// Plan the delivery route for a service date
    Plan {
        /// Service date, YYYY-MM-DD
        #[arg(long, help = "Service date (YYYY-MM-DD), defaults to today")]
        date: Option<NaiveDate>,
        #[arg(long, help = "Postal code or address of the starting location")]
        postal_code: String,
        #[arg(long, help = "Id of the staff member the route is planned for")]
        planner_id: String,
    },
    /// Show the effective configuration
    Config {
        #[arg(long, help = "Write the effective configuration to this TOML file")]
        write: Option<PathBuf>,
    },
}

impl Commands {
    /// Name used for the workflow span
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Show { .. } => "show",
            Commands::Confirm { .. } => "confirm",
            Commands::Book { .. } => "book",
            Commands::Cancel { .. } => "cancel",
            Commands::Label { .. } => "label",
            Commands::BookingLabel { .. } => "booking-label",
            Commands::Locate { .. } => "locate",
            Commands::Plan { .. } => "plan",
            Commands::Config { .. } => "config",
        }
    }
}
