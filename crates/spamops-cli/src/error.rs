//! Error types for the SpamOps CLI
//!
//! CLI errors are user-facing: each message says what went wrong and what to
//! try next.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// A pipeline stage failed
    #[error("{0}")]
    Pipeline(#[from] spamops_common::SpamOpsError),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}. Check your environment variables (SPAMOPS_*) or .env file.")]
    Config(String),

    /// The prediction service could not be reached or answered with an error
    #[error("Prediction service error: {0}. Ensure the service is running (spamops-server) and reachable.")]
    Service(String),

    /// JSON output could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),
}
