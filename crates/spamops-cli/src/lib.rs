//! SpamOps CLI Library
//!
//! Operator entry points for the spam/ham classifier pipeline:
//!
//! - **ETL**: clean and version the raw corpus (`spamops etl`)
//! - **Training**: fit and register a model version (`spamops train`)
//! - **Evaluation**: score predictions and run the promotion gate
//!   (`spamops evaluate`)
//! - **Registry**: inspect versions and staging readiness
//!   (`spamops registry status`)
//! - **Prediction**: smoke-test the deployed service (`spamops predict`)

pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};

/// SpamOps - spam/ham classifier pipeline operations
#[derive(Parser, Debug)]
#[command(name = "spamops")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ETL pipeline over the configured raw source
    Etl,

    /// Train the classifier on a versioned dataset and register the model
    Train {
        /// Processed dataset location (local path or s3:// URI)
        data_path: String,
    },

    /// Score a predictions table and promote the model if it qualifies
    Evaluate {
        /// Predictions table location (local path or s3:// URI)
        predictions_path: String,
    },

    /// Inspect the model registry
    Registry {
        #[command(subcommand)]
        command: RegistryCommand,
    },

    /// Send a message to the prediction service
    Predict {
        /// Message text to classify
        text: String,

        /// Prediction service URL
        #[arg(
            long,
            env = "SPAMOPS_PREDICT_URL",
            default_value = "http://localhost:5000"
        )]
        server_url: String,
    },
}

/// Registry subcommands
#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Show registered versions and staging readiness
    Status,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipeline_commands() {
        let cli = Cli::try_parse_from(["spamops", "etl"]).unwrap();
        assert!(matches!(cli.command, Commands::Etl));

        let cli = Cli::try_parse_from(["spamops", "train", "/tmp/data.parquet"]).unwrap();
        match cli.command {
            Commands::Train { data_path } => assert_eq!(data_path, "/tmp/data.parquet"),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["spamops", "registry", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Registry {
                command: RegistryCommand::Status
            }
        ));
    }

    #[test]
    fn predict_takes_a_server_url_override() {
        let cli = Cli::try_parse_from([
            "spamops",
            "predict",
            "win free cash",
            "--server-url",
            "http://example:8080",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict { text, server_url } => {
                assert_eq!(text, "win free cash");
                assert_eq!(server_url, "http://example:8080");
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["spamops"]).is_err());
    }
}
