//! seco CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use seco_client::cli::{Cli, Command, ConfigAction};
use seco_client::commands;
use seco_client::config::ClientConfig;
use seco_client::error::ClientResult;
use seco_core::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::cli(cli.debug).with_format(cli.log_format)) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    }
    .with_overrides(cli.host, cli.port, cli.client_id);
    config.validate()?;

    match cli.command {
        Command::Fetch { request_type, data } => {
            commands::fetch::run(&config, request_type, &data, cli.json).await
        }
        Command::Check { hashes } => commands::check::run(&config, hashes, cli.json).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
