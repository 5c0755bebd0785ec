//! Extract, transform, load
//!
//! One ETL run reads the raw labeled corpus, cleans it into the validated
//! `label`/`text` schema, checks the batch for text-length drift, and
//! persists the result under its content-hash version.

use crate::config::Settings;
use crate::dataset_io::{dataset_to_parquet, raw_table_from_csv};
use crate::drift::DriftMonitor;
use crate::store::DataStore;
use crate::tracking::{RunId, TrackingClient};
use crate::versioning::DataVersioner;
use spamops_common::types::{Dataset, Label, RawTable, Record, TransformReport};
use spamops_common::{Result, SpamOpsError};
use std::collections::HashSet;
use tracing::{info, warn};

/// File name of the persisted dataset inside its version directory.
pub const DATASET_FILE_NAME: &str = "data.parquet";

/// Clean a raw table into the validated dataset schema.
///
/// Steps, in order: rename `v1`/`v2` aliases, require the `label`/`text`
/// columns, project to them, drop rows with missing values, drop exact
/// duplicates, normalize text, and drop rows with labels outside the valid
/// set. Missing columns are fatal; bad rows are only counted.
pub fn transform(raw: &RawTable) -> Result<(Dataset, TransformReport)> {
    info!("Transforming data");

    // Standardize column names; a no-op when the source already matches.
    let columns: Vec<String> = raw
        .columns
        .iter()
        .map(|c| match c.as_str() {
            "v1" => "label".to_string(),
            "v2" => "text".to_string(),
            _ => c.clone(),
        })
        .collect();

    let required = ["label", "text"];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !columns.iter().any(|c| c == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SpamOpsError::Schema {
            missing,
            available: columns,
        });
    }

    // Both positions exist after the check above.
    let label_index = columns.iter().position(|c| c == "label").unwrap_or(0);
    let text_index = columns.iter().position(|c| c == "text").unwrap_or(0);

    // Project to the two required columns, then drop incomplete rows before
    // deduplicating; the order matters for which duplicate survives.
    let initial_count = raw.rows.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut kept: Vec<(String, String)> = Vec::new();
    for row in &raw.rows {
        let label = row.get(label_index).cloned().flatten();
        let text = row.get(text_index).cloned().flatten();
        let (Some(label), Some(text)) = (label, text) else {
            continue;
        };
        if !seen.insert((label.clone(), text.clone())) {
            continue;
        }
        kept.push((label, text));
    }

    let dropped_rows = initial_count - kept.len();
    if dropped_rows > 0 {
        info!(dropped_rows, "Dropped rows (duplicates/missing values)");
    }

    // Normalize text, then validate labels against the closed set.
    let mut records = Vec::with_capacity(kept.len());
    let mut dropped_invalid_labels = 0usize;
    for (label, text) in kept {
        match label.parse::<Label>() {
            Ok(label) => {
                let text = text.to_lowercase().trim().to_string();
                records.push(Record::new(label, text));
            },
            Err(_) => dropped_invalid_labels += 1,
        }
    }

    if dropped_invalid_labels > 0 {
        warn!(
            count = dropped_invalid_labels,
            "Found rows with invalid labels; dropping them"
        );
    }

    let dataset = Dataset::new(records);
    info!(rows = dataset.len(), "Transformed data");
    Ok((
        dataset,
        TransformReport {
            dropped_rows,
            dropped_invalid_labels,
        },
    ))
}

/// Sequential ETL over the configured raw source and processed destination.
pub struct EtlPipeline<'a> {
    settings: &'a Settings,
    store: &'a DataStore,
    tracking: &'a dyn TrackingClient,
}

impl<'a> EtlPipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        store: &'a DataStore,
        tracking: &'a dyn TrackingClient,
    ) -> Self {
        Self {
            settings,
            store,
            tracking,
        }
    }

    /// Read the raw source in a single attempt; failures propagate unretried.
    pub async fn extract(&self) -> Result<RawTable> {
        let location = &self.settings.data.raw_data_path;
        info!("Extracting data from {location}");

        let bytes = self
            .store
            .get(location)
            .await
            .map_err(|e| SpamOpsError::SourceRead {
                location: location.clone(),
                reason: format!("{e:#}"),
            })?;

        let table = raw_table_from_csv(&bytes)?;
        info!("Extracted {} rows", table.rows.len());
        Ok(table)
    }

    /// Persist the cleaned dataset under its content-hash version.
    ///
    /// The destination directory is created for local paths; object-store
    /// destinations need no pre-creation. Re-running with identical content
    /// recomputes the same hash and overwrites the same path, so a retry
    /// after a failed write is safe.
    pub async fn load(&self, run: &RunId, dataset: &Dataset) -> Result<String> {
        let dataset_version = DataVersioner::compute_hash(dataset);

        let base = self.settings.data.processed_data_base.trim_end_matches('/');
        let output_path = format!("{base}/{dataset_version}/{DATASET_FILE_NAME}");
        info!("Loading data to {output_path}");

        let bytes = dataset_to_parquet(dataset)?;
        self.store
            .put(&output_path, bytes)
            .await
            .map_err(|e| SpamOpsError::Write {
                location: output_path.clone(),
                reason: format!("{e:#}"),
            })?;

        self.tracking
            .log_param(run, "dataset_version", &dataset_version)
            .await?;
        self.tracking
            .log_param(run, "processed_rows", &dataset.len().to_string())
            .await?;
        self.tracking
            .log_param(run, "output_path", &output_path)
            .await?;

        Ok(output_path)
    }

    /// Run extract, transform, drift check, and load as one sequential pass.
    ///
    /// Returns the versioned output location.
    pub async fn run(&self, run: &RunId) -> Result<String> {
        info!("Starting ETL pipeline");

        let raw = self.extract().await?;
        let (dataset, _report) = transform(&raw)?;

        let monitor = DriftMonitor::new(
            self.settings.monitoring.drift_baseline_mean,
            self.settings.monitoring.drift_threshold,
        );
        let has_drift = monitor.check(&dataset.texts());
        self.tracking
            .log_metric(
                run,
                "text_length_drift_detected",
                if has_drift { 1.0 } else { 0.0 },
            )
            .await?;

        let output_path = self.load(run, &dataset).await?;
        info!("ETL pipeline completed. Output: {output_path}");
        Ok(output_path)
    }
}
