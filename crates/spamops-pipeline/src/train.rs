//! Training pipeline
//!
//! Fits the model pipeline on a versioned dataset, writes the training-set
//! predictions next to it, and registers the trained artifact as a new model
//! version in stage `None`.

use crate::config::Settings;
use crate::dataset_io::{dataset_from_parquet, predictions_to_parquet, PredictionFrame, PredictionRow};
use crate::metrics::f1_score;
use crate::model::SpamHamPipeline;
use crate::registry::ModelRegistry;
use crate::store::DataStore;
use crate::tracking::{RunId, TrackingClient};
use spamops_common::types::{Label, RegisteredVersion};
use spamops_common::{Result, SpamOpsError};
use tracing::info;

/// File name of the persisted model artifact.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Result of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub f1: f64,
    pub predictions_path: String,
    pub registered: RegisteredVersion,
}

/// Derive the predictions output location from the dataset location.
fn predictions_path_for(data_path: &str) -> String {
    match data_path.strip_suffix(".parquet") {
        Some(stem) => format!("{stem}_with_preds.parquet"),
        None => format!("{data_path}_with_preds.parquet"),
    }
}

/// Sequential training over a versioned dataset.
pub struct TrainingPipeline<'a> {
    settings: &'a Settings,
    store: &'a DataStore,
    tracking: &'a dyn TrackingClient,
    registry: &'a dyn ModelRegistry,
}

impl<'a> TrainingPipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        store: &'a DataStore,
        tracking: &'a dyn TrackingClient,
        registry: &'a dyn ModelRegistry,
    ) -> Self {
        Self {
            settings,
            store,
            tracking,
            registry,
        }
    }

    pub async fn run(&self, run: &RunId, data_path: &str) -> Result<TrainingOutcome> {
        info!("Loading training data from {data_path}");
        let bytes = self
            .store
            .get(data_path)
            .await
            .map_err(|e| SpamOpsError::SourceRead {
                location: data_path.to_string(),
                reason: format!("{e:#}"),
            })?;
        let dataset = dataset_from_parquet(bytes)?;

        let texts = dataset.texts();
        let labels = dataset.labels();

        let mut pipeline = SpamHamPipeline::build(&self.settings.model);
        pipeline.fit(&texts, &labels);

        let predictions = pipeline.predict(&texts);
        let f1 = f1_score(&labels, &predictions, Label::Spam);
        info!(f1, "Training-set F1 computed");

        // Persist the training set with its predictions for the evaluation
        // stage.
        let frame = PredictionFrame {
            rows: dataset
                .records
                .iter()
                .zip(predictions.iter())
                .map(|(record, prediction)| PredictionRow {
                    label: record.label,
                    text: record.text.clone(),
                    prediction: *prediction,
                })
                .collect(),
        };
        let predictions_path = predictions_path_for(data_path);
        self.store
            .put(&predictions_path, predictions_to_parquet(&frame)?)
            .await
            .map_err(|e| SpamOpsError::Write {
                location: predictions_path.clone(),
                reason: format!("{e:#}"),
            })?;

        self.tracking.log_metric(run, "f1_score", f1).await?;
        self.tracking
            .log_param(run, "model_type", "tfidf_logreg")
            .await?;
        self.tracking
            .log_param(run, "predictions_output_path", &predictions_path)
            .await?;

        // Register the trained artifact as a new version in stage `None`;
        // promotion to Staging is the evaluation pipeline's decision.
        let models_base = self.settings.data.models_base.trim_end_matches('/');
        let artifact_path = format!(
            "{models_base}/{}/{}/{MODEL_FILE_NAME}",
            self.settings.model.name,
            run.as_str()
        );
        self.store
            .put(&artifact_path, pipeline.to_bytes()?)
            .await
            .map_err(|e| SpamOpsError::Artifact(format!("{artifact_path}: {e:#}")))?;

        self.registry
            .ensure_registered(&self.settings.model.name)
            .await?;
        let registered = self
            .registry
            .create_version(&self.settings.model.name, &artifact_path, Some(run.as_str()))
            .await?;
        info!(
            version = registered.version,
            "Registered model version from training run"
        );

        Ok(TrainingOutcome {
            f1,
            predictions_path,
            registered,
        })
    }
}
