//! `spamops etl` - run extract, transform, and load

use crate::error::Result;
use spamops_pipeline::config::Settings;
use spamops_pipeline::etl::EtlPipeline;
use spamops_pipeline::store::DataStore;
use spamops_pipeline::tracking::{RestTracking, TrackingClient};
use tracing::info;

pub async fn run(settings: &Settings) -> Result<()> {
    let store = DataStore::new();
    let tracking = RestTracking::new(
        &settings.tracking.uri,
        &settings.tracking.experiment_name,
    )?;

    let run = tracking.start_run("etl").await?;
    let result = EtlPipeline::new(settings, &store, &tracking).run(&run).await;
    // Close the run even when the pipeline failed.
    let ended = tracking.end_run(&run).await;

    let output_path = result?;
    ended?;

    info!("ETL completed. Output: {output_path}");
    // For external capture.
    println!("{output_path}");
    Ok(())
}
