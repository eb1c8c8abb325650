//! nextrace CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use nextrace_core::{TracingConfig, init_tracing};

use nextrace_client::cli::{Cli, Command, ConfigAction};
use nextrace_client::commands;
use nextrace_client::error::{ClientError, ClientResult};
use nextrace_service::{RaceService, ServiceConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    // A subscriber may already be installed; logging is best effort here.
    let _ = init_tracing(tracing);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ServiceConfig::load_from(path).map_err(|e| ClientError::Config(e.to_string()))?
    } else {
        ServiceConfig::load()?
    };

    match cli.command {
        None => {
            let service = RaceService::new(config)?;
            commands::races::run(&service, cli.json, false).await
        }
        Some(Command::Races { feed }) => {
            let service = RaceService::new(config)?;
            commands::races::run(&service, cli.json, feed).await
        }
        Some(Command::Calendar { category, output }) => {
            let service = RaceService::new(config)?;
            commands::calendar::run(&service, category.as_deref(), output.as_deref()).await
        }
        Some(Command::Categories) => commands::categories::run(&config, cli.json),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
