//! Estate CLI Application
//!
//! Command-line interface for the estate brokerage CRM.

mod args;
mod cli;
mod renderer;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use estate_core::{params::ListCustomers, CrmError, DatabaseManagerBuilder};
use log::info;
use renderer::{OutputMode, TerminalRenderer};
use Commands::*;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<CrmError>())
                .map_or("ERROR", CrmError::code);
            eprintln!("Error [{code}]: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let Args {
        database_file,
        max_connections,
        no_color,
        json,
        command,
    } = args;

    let db = DatabaseManagerBuilder::new()
        .with_database_path(database_file)
        .with_max_connections(max_connections)
        .init()
        .await
        .context("Failed to initialize database")?;

    let cli = Cli::new(db, TerminalRenderer::new(OutputMode::from_flags(json, no_color)));

    info!("Estate started");

    let outcome = match command {
        Some(Customer { command }) => cli.handle_customer_command(command).await,
        Some(Viewing { command }) => cli.handle_viewing_command(command).await,
        Some(Stats) => cli.statistics().await,
        Some(Health) => cli.health().await,
        None => cli.list_customers(&ListCustomers::default()).await,
    };

    cli.shutdown();
    outcome
}
