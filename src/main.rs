use anyhow::Result;
use clap::Parser;
use tracing::Instrument;

use delivery_console::cli::commands::config::ConfigCommand;
use delivery_console::cli::commands::delivery::{ActionCommand, ShowCommand};
use delivery_console::cli::commands::route::{LocateCommand, PlanCommand};
use delivery_console::cli::commands::{show_how_to_get_started, Command};
use delivery_console::cli::{Cli, Commands};
use delivery_console::{config, create_workflow_span, generate_correlation_id, init_telemetry, WorkflowAction};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let yes = cli.yes;

    let Some(command) = cli.command else {
        return show_how_to_get_started().await;
    };

    let settings = config()?;
    if let Err(e) = init_telemetry(&settings.observability) {
        eprintln!("Warning: Failed to initialize telemetry: {e}");
    }

    let correlation_id = generate_correlation_id();
    let span = create_workflow_span(command.name(), &correlation_id);

    async move {
        match command {
            Commands::Show { id } => ShowCommand::new(id).execute().await,
            Commands::Confirm { id } => action(id, WorkflowAction::Confirm, yes).await,
            Commands::Book { id } => action(id, WorkflowAction::Book, yes).await,
            Commands::Cancel { id } => action(id, WorkflowAction::Cancel, yes).await,
            Commands::Label { id } => action(id, WorkflowAction::DownloadLabel, yes).await,
            Commands::BookingLabel { id } => {
                action(id, WorkflowAction::DownloadBookingLabel, yes).await
            }
            Commands::Locate { postal_code } => LocateCommand::new(postal_code).execute().await,
            Commands::Plan {
                date,
                postal_code,
                planner_id,
            } => {
                PlanCommand::new(postal_code, planner_id)
                    .with_date(date)
                    .execute()
                    .await
            }
            Commands::Config { write } => ConfigCommand::new().with_write(write).execute().await,
        }
    }
    .instrument(span)
    .await
}

async fn action(id: String, action: WorkflowAction, yes: bool) -> Result<()> {
    ActionCommand::new(id, action)
        .with_auto_approve(yes)
        .execute()
        .await
}
