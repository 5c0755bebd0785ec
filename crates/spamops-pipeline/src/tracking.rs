//! Tracking collaborator client
//!
//! Runs, parameters, and metrics are owned by an external tracking server
//! with an MLflow-compatible REST surface. The pipeline only ever holds a
//! run handle and logs against it; nothing is persisted locally.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use spamops_common::{Result, SpamOpsError};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default timeout for tracking server requests in seconds.
pub const DEFAULT_TRACKING_TIMEOUT_SECS: u64 = 30;

/// Handle for an active tracking run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability set the pipeline needs from the tracking collaborator.
///
/// Connectivity failures surface as [`SpamOpsError::Tracking`] and are not
/// retried here.
#[async_trait]
pub trait TrackingClient: Send + Sync {
    /// Open a named run; the caller ends it when the pipeline finishes.
    async fn start_run(&self, run_name: &str) -> Result<RunId>;

    async fn log_param(&self, run: &RunId, key: &str, value: &str) -> Result<()>;

    async fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<()>;

    async fn end_run(&self, run: &RunId) -> Result<()>;
}

// ============================================================================
// REST implementation
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExperimentResponse {
    experiment: Experiment,
}

#[derive(Debug, Deserialize)]
struct Experiment {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    run: RunBody,
}

#[derive(Debug, Deserialize)]
struct RunBody {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

/// Tracking client against an MLflow-compatible REST server.
pub struct RestTracking {
    client: reqwest::Client,
    base_url: String,
    experiment_name: String,
}

impl RestTracking {
    pub fn new(base_url: &str, experiment_name: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TRACKING_TIMEOUT_SECS))
            .build()
            .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            experiment_name: experiment_name.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/2.0/mlflow/{endpoint}", self.base_url)
    }

    async fn post(&self, endpoint: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpamOpsError::Tracking(format!(
                "{endpoint} failed with {status}: {body}"
            )));
        }
        Ok(response)
    }

    /// Resolve the configured experiment, creating it on first use.
    async fn experiment_id(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url("experiments/get-by-name"))
            .query(&[("experiment_name", self.experiment_name.as_str())])
            .send()
            .await
            .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;

        if response.status().is_success() {
            let parsed: ExperimentResponse = response
                .json()
                .await
                .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;
            return Ok(parsed.experiment.experiment_id);
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(
                experiment = %self.experiment_name,
                "Experiment not found; creating it"
            );
            let response = self
                .post("experiments/create", json!({ "name": self.experiment_name }))
                .await?;
            let parsed: CreateExperimentResponse = response
                .json()
                .await
                .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;
            return Ok(parsed.experiment_id);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SpamOpsError::Tracking(format!(
            "experiments/get-by-name failed with {status}: {body}"
        )))
    }
}

#[async_trait]
impl TrackingClient for RestTracking {
    async fn start_run(&self, run_name: &str) -> Result<RunId> {
        let experiment_id = self.experiment_id().await?;
        let response = self
            .post(
                "runs/create",
                json!({
                    "experiment_id": experiment_id,
                    "run_name": run_name,
                    "start_time": Utc::now().timestamp_millis(),
                }),
            )
            .await?;
        let parsed: RunResponse = response
            .json()
            .await
            .map_err(|e| SpamOpsError::Tracking(e.to_string()))?;
        Ok(RunId::new(parsed.run.info.run_id))
    }

    async fn log_param(&self, run: &RunId, key: &str, value: &str) -> Result<()> {
        self.post(
            "runs/log-parameter",
            json!({ "run_id": run.as_str(), "key": key, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<()> {
        self.post(
            "runs/log-metric",
            json!({
                "run_id": run.as_str(),
                "key": key,
                "value": value,
                "timestamp": Utc::now().timestamp_millis(),
                "step": 0,
            }),
        )
        .await?;
        Ok(())
    }

    async fn end_run(&self, run: &RunId) -> Result<()> {
        self.post(
            "runs/update",
            json!({
                "run_id": run.as_str(),
                "status": "FINISHED",
                "end_time": Utc::now().timestamp_millis(),
            }),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// In-memory implementation (tests, dry runs)
// ============================================================================

/// A run recorded by [`InMemoryTracking`].
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub id: RunId,
    pub name: String,
    pub params: Vec<(String, String)>,
    pub metrics: Vec<(String, f64)>,
    pub finished: bool,
}

/// Tracking client that records everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryTracking {
    runs: Mutex<Vec<RecordedRun>>,
}

impl InMemoryTracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.lock().clone()
    }

    pub fn params_for(&self, run: &RunId) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .find(|r| &r.id == run)
            .map(|r| r.params.clone())
            .unwrap_or_default()
    }

    pub fn metrics_for(&self, run: &RunId) -> Vec<(String, f64)> {
        self.lock()
            .iter()
            .find(|r| &r.id == run)
            .map(|r| r.metrics.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RecordedRun>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_run<F: FnOnce(&mut RecordedRun)>(&self, run: &RunId, f: F) -> Result<()> {
        let mut runs = self.lock();
        let recorded = runs
            .iter_mut()
            .find(|r| &r.id == run)
            .ok_or_else(|| SpamOpsError::Tracking(format!("unknown run: {run}")))?;
        f(recorded);
        Ok(())
    }
}

#[async_trait]
impl TrackingClient for InMemoryTracking {
    async fn start_run(&self, run_name: &str) -> Result<RunId> {
        let id = RunId::new(Uuid::new_v4().to_string());
        self.lock().push(RecordedRun {
            id: id.clone(),
            name: run_name.to_string(),
            params: Vec::new(),
            metrics: Vec::new(),
            finished: false,
        });
        Ok(id)
    }

    async fn log_param(&self, run: &RunId, key: &str, value: &str) -> Result<()> {
        self.with_run(run, |r| r.params.push((key.to_string(), value.to_string())))
    }

    async fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<()> {
        self.with_run(run, |r| r.metrics.push((key.to_string(), value)))
    }

    async fn end_run(&self, run: &RunId) -> Result<()> {
        self.with_run(run, |r| r.finished = true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_tracking_records_runs() {
        let tracking = InMemoryTracking::new();
        let run = tracking.start_run("etl").await.unwrap();

        tracking.log_param(&run, "dataset_version", "abc").await.unwrap();
        tracking.log_metric(&run, "rows", 10.0).await.unwrap();
        tracking.end_run(&run).await.unwrap();

        let runs = tracking.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].name, "etl");
        assert_eq!(runs[0].params, vec![("dataset_version".to_string(), "abc".to_string())]);
        assert_eq!(runs[0].metrics, vec![("rows".to_string(), 10.0)]);
        assert!(runs[0].finished);
    }

    #[tokio::test]
    async fn logging_against_an_unknown_run_fails() {
        let tracking = InMemoryTracking::new();
        let bogus = RunId::new("missing");
        assert!(tracking.log_param(&bogus, "k", "v").await.is_err());
    }
}
