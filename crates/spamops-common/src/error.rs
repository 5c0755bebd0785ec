//! Error types for SpamOps

use thiserror::Error;

/// Result type alias for SpamOps operations
pub type Result<T> = std::result::Result<T, SpamOpsError>;

/// Main error type for SpamOps
#[derive(Error, Debug)]
pub enum SpamOpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to read raw data source '{location}': {reason}")]
    SourceRead { location: String, reason: String },

    #[error("Data missing required columns: {missing:?}. Available: {available:?}")]
    Schema {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Model does not meet quality threshold: F1 {score} < {threshold}")]
    QualityGate { score: f64, threshold: f64 },

    #[error("Failed to write processed data to '{location}': {reason}")]
    Write { location: String, reason: String },

    #[error("Tracking server error: {0}")]
    Tracking(String),

    #[error("Model registry error: {0}")]
    Registry(String),

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_missing_columns() {
        let err = SpamOpsError::Schema {
            missing: vec!["label".to_string()],
            available: vec!["v3".to_string(), "text".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("label"));
        assert!(msg.contains("v3"));
    }

    #[test]
    fn quality_gate_error_reports_score_and_threshold() {
        let err = SpamOpsError::QualityGate {
            score: 0.80,
            threshold: 0.85,
        };
        assert!(err.to_string().contains("0.8"));
        assert!(err.to_string().contains("0.85"));
    }
}
