mod cli;
mod commands;
mod interactive;
mod logging;

pub mod downloader;
pub mod render;
pub mod session;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cli::{Cli, Commands};
use downloader::{ApiClient, Downloader};

/// Entry point shared by the binary
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match cli.api_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    log::info!(
        "[Config] {} environment, backend {}",
        config.environment,
        config.base_url()
    );

    let client = match ApiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let downloader = Arc::new(Downloader::new(client));
    let command = cli.command.unwrap_or(Commands::Interactive);
    runtime.block_on(commands::dispatch(command, downloader, cli.json))
}
