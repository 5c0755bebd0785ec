//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Default tracking server URI for local development.
pub const DEFAULT_TRACKING_URI: &str = "http://localhost:5000";

/// Default experiment name grouping pipeline runs.
pub const DEFAULT_EXPERIMENT_NAME: &str = "spam-ham-classifier";

/// Default registered model name.
pub const DEFAULT_MODEL_NAME: &str = "SpamHamClassifier";

/// Default raw data location (object storage or local path).
pub const DEFAULT_RAW_DATA_PATH: &str = "s3://spamops-ml-data/data/spam.csv";

/// Default base destination for versioned processed datasets.
pub const DEFAULT_PROCESSED_DATA_BASE: &str = "s3://spamops-ml-data/data/processed";

/// Default base destination for model artifacts.
pub const DEFAULT_MODELS_BASE: &str = "s3://spamops-ml-data/models";

/// Minimum F1 score a model must reach to enter Staging.
pub const DEFAULT_F1_THRESHOLD: f64 = 0.85;

/// Baseline mean text length for the drift check (characters).
pub const DEFAULT_DRIFT_BASELINE_MEAN: f64 = 80.0;

/// Allowed absolute deviation from the drift baseline before flagging.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 30.0;

/// Seed for reproducible training runs.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Default gradient-descent epoch count.
pub const DEFAULT_TRAIN_EPOCHS: usize = 200;

/// Default gradient-descent learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.5;

/// Default vocabulary cap for the TF-IDF vectorizer.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataConfig,
    pub tracking: TrackingConfig,
    pub model: ModelConfig,
    pub monitoring: MonitoringConfig,
}

/// Data locations for the ETL stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub raw_data_path: String,
    pub processed_data_base: String,
    pub models_base: String,
}

/// Tracking collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub uri: String,
    pub experiment_name: String,
}

/// Model and quality-gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub f1_threshold: f64,
    pub random_state: u64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub max_features: usize,
}

/// Drift monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub drift_baseline_mean: f64,
    pub drift_threshold: f64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Load configuration from environment and defaults.
    ///
    /// Constructed once at process start and passed into each component;
    /// core logic never reads the environment itself.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings {
            data: DataConfig {
                raw_data_path: std::env::var("SPAMOPS_RAW_DATA_PATH")
                    .unwrap_or_else(|_| DEFAULT_RAW_DATA_PATH.to_string()),
                processed_data_base: std::env::var("SPAMOPS_PROCESSED_DATA_BASE")
                    .unwrap_or_else(|_| DEFAULT_PROCESSED_DATA_BASE.to_string()),
                models_base: std::env::var("SPAMOPS_MODELS_BASE")
                    .unwrap_or_else(|_| DEFAULT_MODELS_BASE.to_string()),
            },
            tracking: TrackingConfig {
                uri: std::env::var("SPAMOPS_TRACKING_URI")
                    .unwrap_or_else(|_| DEFAULT_TRACKING_URI.to_string()),
                experiment_name: std::env::var("SPAMOPS_EXPERIMENT_NAME")
                    .unwrap_or_else(|_| DEFAULT_EXPERIMENT_NAME.to_string()),
            },
            model: ModelConfig {
                name: std::env::var("SPAMOPS_MODEL_NAME")
                    .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string()),
                f1_threshold: env_or("SPAMOPS_F1_THRESHOLD", DEFAULT_F1_THRESHOLD),
                random_state: env_or("SPAMOPS_RANDOM_STATE", DEFAULT_RANDOM_STATE),
                epochs: env_or("SPAMOPS_TRAIN_EPOCHS", DEFAULT_TRAIN_EPOCHS),
                learning_rate: env_or("SPAMOPS_LEARNING_RATE", DEFAULT_LEARNING_RATE),
                max_features: env_or("SPAMOPS_MAX_FEATURES", DEFAULT_MAX_FEATURES),
            },
            monitoring: MonitoringConfig {
                drift_baseline_mean: env_or(
                    "SPAMOPS_DRIFT_BASELINE_MEAN",
                    DEFAULT_DRIFT_BASELINE_MEAN,
                ),
                drift_threshold: env_or("SPAMOPS_DRIFT_THRESHOLD", DEFAULT_DRIFT_THRESHOLD),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.data.raw_data_path.is_empty() {
            anyhow::bail!("raw data path must not be empty");
        }
        if self.data.processed_data_base.is_empty() {
            anyhow::bail!("processed data base must not be empty");
        }
        if self.model.name.is_empty() {
            anyhow::bail!("model name must not be empty");
        }
        if !(0.0..=1.0).contains(&self.model.f1_threshold) {
            anyhow::bail!(
                "F1 threshold must be within [0, 1], got {}",
                self.model.f1_threshold
            );
        }
        if self.model.epochs == 0 {
            anyhow::bail!("training epoch count must be positive");
        }
        if self.model.learning_rate <= 0.0 {
            anyhow::bail!("learning rate must be positive");
        }
        if self.model.max_features == 0 {
            anyhow::bail!("max features must be positive");
        }
        if self.monitoring.drift_threshold < 0.0 {
            anyhow::bail!("drift threshold must not be negative");
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data: DataConfig {
                raw_data_path: DEFAULT_RAW_DATA_PATH.to_string(),
                processed_data_base: DEFAULT_PROCESSED_DATA_BASE.to_string(),
                models_base: DEFAULT_MODELS_BASE.to_string(),
            },
            tracking: TrackingConfig {
                uri: DEFAULT_TRACKING_URI.to_string(),
                experiment_name: DEFAULT_EXPERIMENT_NAME.to_string(),
            },
            model: ModelConfig {
                name: DEFAULT_MODEL_NAME.to_string(),
                f1_threshold: DEFAULT_F1_THRESHOLD,
                random_state: DEFAULT_RANDOM_STATE,
                epochs: DEFAULT_TRAIN_EPOCHS,
                learning_rate: DEFAULT_LEARNING_RATE,
                max_features: DEFAULT_MAX_FEATURES,
            },
            monitoring: MonitoringConfig {
                drift_baseline_mean: DEFAULT_DRIFT_BASELINE_MEAN,
                drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            },
        }
    }
}
