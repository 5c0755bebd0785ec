//! `spamops train` - fit the classifier and register a model version

use crate::error::Result;
use spamops_pipeline::config::Settings;
use spamops_pipeline::registry::RestRegistry;
use spamops_pipeline::store::DataStore;
use spamops_pipeline::tracking::{RestTracking, TrackingClient};
use spamops_pipeline::train::TrainingPipeline;
use tracing::info;

/// Current git commit for run lineage; "unknown" outside a checkout.
fn git_commit() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn run(settings: &Settings, data_path: &str) -> Result<()> {
    let store = DataStore::new();
    let tracking = RestTracking::new(
        &settings.tracking.uri,
        &settings.tracking.experiment_name,
    )?;
    let registry = RestRegistry::new(&settings.tracking.uri)?;

    let run = tracking.start_run("training").await?;
    tracking.log_param(&run, "git_commit", &git_commit()).await?;

    let result = TrainingPipeline::new(settings, &store, &tracking, &registry)
        .run(&run, data_path)
        .await;
    let ended = tracking.end_run(&run).await;

    let outcome = result?;
    ended?;

    info!(f1 = outcome.f1, "Training completed");
    info!(
        version = outcome.registered.version,
        "Model version registered in stage None"
    );
    // For external capture.
    println!("{}", outcome.predictions_path);
    Ok(())
}
