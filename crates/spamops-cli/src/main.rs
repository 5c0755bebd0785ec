//! SpamOps CLI - Main entry point

use clap::Parser;
use spamops_cli::{Cli, CliError, Commands, RegistryCommand};
use spamops_common::logging::{init_logging, LogConfig, LogLevel};
use spamops_pipeline::config::Settings;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on the verbose flag; environment variables
    // take precedence when set.
    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        })
        .log_file_prefix("spamops-cli".to_string())
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // The CLI keeps working even when logging cannot initialize.
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> spamops_cli::Result<()> {
    match &cli.command {
        Commands::Etl => {
            let settings = load_settings()?;
            spamops_cli::commands::etl::run(&settings).await
        },

        Commands::Train { data_path } => {
            let settings = load_settings()?;
            spamops_cli::commands::train::run(&settings, data_path).await
        },

        Commands::Evaluate { predictions_path } => {
            let settings = load_settings()?;
            spamops_cli::commands::evaluate::run(&settings, predictions_path).await
        },

        Commands::Registry { command } => match command {
            RegistryCommand::Status => {
                let settings = load_settings()?;
                spamops_cli::commands::registry::status(&settings).await
            },
        },

        Commands::Predict { text, server_url } => {
            spamops_cli::commands::predict::run(server_url, text).await
        },
    }
}

fn load_settings() -> spamops_cli::Result<Settings> {
    Settings::load().map_err(|e| CliError::Config(e.to_string()))
}
