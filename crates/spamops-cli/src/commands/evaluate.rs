//! `spamops evaluate` - score predictions and run the promotion gate

use crate::error::Result;
use spamops_pipeline::config::Settings;
use spamops_pipeline::evaluate::EvaluationPipeline;
use spamops_pipeline::registry::RestRegistry;
use spamops_pipeline::store::DataStore;
use spamops_pipeline::tracking::{RestTracking, TrackingClient};
use spamops_pipeline::PromotionOutcome;
use tracing::info;

pub async fn run(settings: &Settings, predictions_path: &str) -> Result<()> {
    let store = DataStore::new();
    let tracking = RestTracking::new(
        &settings.tracking.uri,
        &settings.tracking.experiment_name,
    )?;
    let registry = RestRegistry::new(&settings.tracking.uri)?;

    let run = tracking.start_run("evaluation").await?;
    let result = EvaluationPipeline::new(settings, &store, &tracking, &registry)
        .run(&run, predictions_path)
        .await;
    let ended = tracking.end_run(&run).await;

    let outcome = result?;
    ended?;

    info!(f1 = outcome.f1, "Evaluation completed");
    match outcome.promotion {
        PromotionOutcome::Promoted(version) => {
            println!(
                "Model version {} promoted to Staging (F1 {:.4}).",
                version.version, outcome.f1
            );
        },
        PromotionOutcome::NoCandidate => {
            println!(
                "No versions of {} found in stage 'None'; nothing to promote.",
                settings.model.name
            );
        },
        // The pipeline maps a failed gate to an error before we get here.
        PromotionOutcome::QualityTooLow { .. } => unreachable!("gate failure is an error"),
    }
    Ok(())
}
