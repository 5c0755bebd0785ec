//! `spamops registry status` - inspect versions and staging readiness

use crate::error::Result;
use spamops_common::types::Stage;
use spamops_pipeline::config::Settings;
use spamops_pipeline::registry::{ModelRegistry, RestRegistry};

pub async fn status(settings: &Settings) -> Result<()> {
    let registry = RestRegistry::new(&settings.tracking.uri)?;
    let model_name = &settings.model.name;

    println!("Checking registry at {}", settings.tracking.uri);

    if !registry.is_registered(model_name).await? {
        println!("Model '{model_name}' is not registered.");
        println!("Run 'spamops train <data_path>' first.");
        return Ok(());
    }
    println!("Found model '{model_name}'.");

    let versions = registry.latest_versions(model_name, &[]).await?;
    if versions.is_empty() {
        println!("No versions found for this model.");
        return Ok(());
    }

    println!();
    println!("Versions found:");
    for version in &versions {
        println!(
            " - Version: {}, Stage: {}, Run: {}",
            version.version,
            version.stage,
            version.run_id.as_deref().unwrap_or("-")
        );
    }

    println!();
    match versions.iter().find(|v| v.stage == Stage::Staging) {
        Some(version) => {
            println!(
                "Ready to serve: version {} is in 'Staging'.",
                version.version
            );
        },
        None => {
            println!("No version is in 'Staging'.");
            println!("Run 'spamops evaluate <predictions_path>' to promote one.");
        },
    }
    Ok(())
}
