//! Evaluation pipeline
//!
//! Scores a predictions table and runs the promotion gate. A score below the
//! quality threshold is fatal here, distinct from the successful no-op of
//! having no candidate to promote.

use crate::config::Settings;
use crate::dataset_io::predictions_from_parquet;
use crate::metrics::f1_score;
use crate::promote::{ModelPromoter, PromotionOutcome};
use crate::registry::ModelRegistry;
use crate::store::DataStore;
use crate::tracking::{RunId, TrackingClient};
use spamops_common::types::Label;
use spamops_common::{Result, SpamOpsError};
use tracing::info;

/// Result of a completed evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    pub f1: f64,
    pub promotion: PromotionOutcome,
}

/// Sequential evaluation over a predictions table.
pub struct EvaluationPipeline<'a> {
    settings: &'a Settings,
    store: &'a DataStore,
    tracking: &'a dyn TrackingClient,
    registry: &'a dyn ModelRegistry,
}

impl<'a> EvaluationPipeline<'a> {
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

    pub async fn run(&self, run: &RunId, predictions_path: &str) -> Result<EvaluationOutcome> {
        info!("Loading predictions from {predictions_path}");
        let bytes = self
            .store
            .get(predictions_path)
            .await
            .map_err(|e| SpamOpsError::SourceRead {
                location: predictions_path.to_string(),
                reason: format!("{e:#}"),
            })?;
        let frame = predictions_from_parquet(bytes)?;

        let y_true: Vec<Label> = frame.rows.iter().map(|r| r.label).collect();
        let y_pred: Vec<Label> = frame.rows.iter().map(|r| r.prediction).collect();
        let f1 = f1_score(&y_true, &y_pred, Label::Spam);
        info!(f1, "Evaluation F1 score");

        self.tracking.log_metric(run, "evaluation_f1", f1).await?;

        let promoter = ModelPromoter::new(
            self.registry,
            &self.settings.model.name,
            self.settings.model.f1_threshold,
        );
        match promoter.promote_if_valid(f1).await? {
            PromotionOutcome::QualityTooLow { score, threshold } => {
                Err(SpamOpsError::QualityGate { score, threshold })
            },
            promotion => Ok(EvaluationOutcome { f1, promotion }),
        }
    }
}
