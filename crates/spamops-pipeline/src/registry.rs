//! Model registry collaborator client
//!
//! Model versions and their lifecycle stages are owned by an external
//! registry with an MLflow-compatible REST surface. This module only reads
//! version listings and requests stage transitions.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use spamops_common::types::{RegisteredVersion, Stage};
use spamops_common::{Result, SpamOpsError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Default timeout for registry requests in seconds.
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 30;

/// Capability set the pipeline needs from the registry collaborator.
///
/// Stage transitions must be atomic on the registry side: concurrent
/// promotions against the same model name rely on the registry serializing
/// them, not on any in-process locking here.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Create the registered model entry if absent; no-op when present.
    async fn ensure_registered(&self, name: &str) -> Result<()>;

    async fn is_registered(&self, name: &str) -> Result<bool>;

    /// The latest version per requested stage, in the order the stages were
    /// requested. An empty stage list means every stage the model has.
    async fn latest_versions(&self, name: &str, stages: &[Stage])
        -> Result<Vec<RegisteredVersion>>;

    /// Register a new version (stage `None`) pointing at a model artifact.
    async fn create_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> Result<RegisteredVersion>;

    async fn transition_stage(
        &self,
        name: &str,
        version: u32,
        stage: Stage,
        archive_existing: bool,
    ) -> Result<()>;
}

/// Parse a `models:/{name}/{stage}` model URI.
pub fn parse_models_uri(uri: &str) -> Result<(String, Stage)> {
    let rest = uri
        .strip_prefix("models:/")
        .ok_or_else(|| SpamOpsError::Registry(format!("not a models:/ URI: {uri}")))?;
    let (name, stage) = rest
        .split_once('/')
        .ok_or_else(|| SpamOpsError::Registry(format!("models:/ URI has no stage: {uri}")))?;
    if name.is_empty() {
        return Err(SpamOpsError::Registry(format!(
            "models:/ URI has no model name: {uri}"
        )));
    }
    Ok((name.to_string(), stage.parse()?))
}

/// Resolve a `models:/{name}/{stage}` URI to the registry's current version
/// for that stage, if any.
pub async fn resolve_model_version(
    registry: &dyn ModelRegistry,
    uri: &str,
) -> Result<Option<RegisteredVersion>> {
    let (name, stage) = parse_models_uri(uri)?;
    let versions = registry.latest_versions(&name, &[stage]).await?;
    Ok(versions.into_iter().next())
}

// ============================================================================
// REST implementation
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiModelVersion {
    name: String,
    version: String,
    current_stage: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    run_id: Option<String>,
}

impl ApiModelVersion {
    fn into_registered(self) -> Result<RegisteredVersion> {
        let version = self
            .version
            .parse::<u32>()
            .map_err(|_| SpamOpsError::Registry(format!("bad version number: {}", self.version)))?;
        Ok(RegisteredVersion {
            name: self.name,
            version,
            stage: self.current_stage.parse()?,
            source: self.source,
            run_id: self.run_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestVersionsResponse {
    #[serde(default)]
    model_versions: Vec<ApiModelVersion>,
}

#[derive(Debug, Deserialize)]
struct CreateVersionResponse {
    model_version: ApiModelVersion,
}

/// Registry client against an MLflow-compatible REST server.
pub struct RestRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl RestRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REGISTRY_TIMEOUT_SECS))
            .build()
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
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
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpamOpsError::Registry(format!(
                "{endpoint} failed with {status}: {body}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelRegistry for RestRegistry {
    async fn ensure_registered(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("registered-models/create"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;

        if response.status().is_success() {
            debug!(model = name, "Registered model created");
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if body.contains("RESOURCE_ALREADY_EXISTS") {
            return Ok(());
        }
        Err(SpamOpsError::Registry(format!(
            "registered-models/create failed with {status}: {body}"
        )))
    }

    async fn is_registered(&self, name: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.url("registered-models/get"))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;

        if response.status().is_success() {
            return Ok(true);
        }
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(SpamOpsError::Registry(format!(
            "registered-models/get failed with {status}: {body}"
        )))
    }

    async fn latest_versions(
        &self,
        name: &str,
        stages: &[Stage],
    ) -> Result<Vec<RegisteredVersion>> {
        let body = if stages.is_empty() {
            json!({ "name": name })
        } else {
            json!({
                "name": name,
                "stages": stages.iter().map(Stage::as_str).collect::<Vec<_>>(),
            })
        };

        let response = self.post("registered-models/get-latest-versions", body).await?;
        let parsed: LatestVersionsResponse = response
            .json()
            .await
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;

        parsed
            .model_versions
            .into_iter()
            .map(ApiModelVersion::into_registered)
            .collect()
    }

    async fn create_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> Result<RegisteredVersion> {
        let mut body = json!({ "name": name, "source": source });
        if let Some(run_id) = run_id {
            body["run_id"] = json!(run_id);
        }

        let response = self.post("model-versions/create", body).await?;
        let parsed: CreateVersionResponse = response
            .json()
            .await
            .map_err(|e| SpamOpsError::Registry(e.to_string()))?;
        parsed.model_version.into_registered()
    }

    async fn transition_stage(
        &self,
        name: &str,
        version: u32,
        stage: Stage,
        archive_existing: bool,
    ) -> Result<()> {
        self.post(
            "model-versions/transition-stage",
            json!({
                "name": name,
                "version": version.to_string(),
                "stage": stage.as_str(),
                "archive_existing_versions": archive_existing,
            }),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// In-memory implementation (tests)
// ============================================================================

#[derive(Debug, Clone)]
struct StoredVersion {
    version: u32,
    stage: Stage,
    source: String,
    run_id: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    models: HashMap<String, Vec<StoredVersion>>,
    calls: usize,
}

/// Registry that keeps all state in memory.
///
/// Version numbers increase with registration order, so "most recently
/// registered" and "highest version number" coincide, matching the external
/// registry's recency ordering.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a model with versions in the given stages, in registration order.
    pub fn with_versions(name: &str, stages: &[Stage]) -> Self {
        let registry = Self::new();
        {
            let mut state = registry.lock();
            let versions = stages
                .iter()
                .enumerate()
                .map(|(i, stage)| StoredVersion {
                    version: i as u32 + 1,
                    stage: *stage,
                    source: format!("memory:/{name}/{}", i + 1),
                    run_id: None,
                })
                .collect();
            state.models.insert(name.to_string(), versions);
        }
        registry
    }

    /// Total number of registry operations invoked, across all methods.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// Current stage of a version, if it exists.
    pub fn stage_of(&self, name: &str, version: u32) -> Option<Stage> {
        self.lock()
            .models
            .get(name)?
            .iter()
            .find(|v| v.version == version)
            .map(|v| v.stage)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ModelRegistry for InMemoryRegistry {
    async fn ensure_registered(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls += 1;
        state.models.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn is_registered(&self, name: &str) -> Result<bool> {
        let mut state = self.lock();
        state.calls += 1;
        Ok(state.models.contains_key(name))
    }

    async fn latest_versions(
        &self,
        name: &str,
        stages: &[Stage],
    ) -> Result<Vec<RegisteredVersion>> {
        let mut state = self.lock();
        state.calls += 1;
        let versions = state.models.get(name).cloned().unwrap_or_default();

        let wanted: Vec<Stage> = if stages.is_empty() {
            let mut present: Vec<Stage> = versions.iter().map(|v| v.stage).collect();
            present.dedup();
            present
        } else {
            stages.to_vec()
        };

        let mut result = Vec::new();
        for stage in wanted {
            if let Some(latest) = versions
                .iter()
                .filter(|v| v.stage == stage)
                .max_by_key(|v| v.version)
            {
                let registered = RegisteredVersion {
                    name: name.to_string(),
                    version: latest.version,
                    stage: latest.stage,
                    source: latest.source.clone(),
                    run_id: latest.run_id.clone(),
                };
                if !result.iter().any(|r: &RegisteredVersion| r.version == registered.version) {
                    result.push(registered);
                }
            }
        }
        Ok(result)
    }

    async fn create_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> Result<RegisteredVersion> {
        let mut state = self.lock();
        state.calls += 1;
        let versions = state.models.entry(name.to_string()).or_default();
        let version = versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;
        versions.push(StoredVersion {
            version,
            stage: Stage::None,
            source: source.to_string(),
            run_id: run_id.map(str::to_string),
        });
        Ok(RegisteredVersion {
            name: name.to_string(),
            version,
            stage: Stage::None,
            source: source.to_string(),
            run_id: run_id.map(str::to_string),
        })
    }

    async fn transition_stage(
        &self,
        name: &str,
        version: u32,
        stage: Stage,
        archive_existing: bool,
    ) -> Result<()> {
        let mut state = self.lock();
        state.calls += 1;
        let versions = state
            .models
            .get_mut(name)
            .ok_or_else(|| SpamOpsError::Registry(format!("unknown model: {name}")))?;

        if archive_existing && stage == Stage::Staging {
            for v in versions.iter_mut() {
                if v.stage == Stage::Staging && v.version != version {
                    v.stage = Stage::Archived;
                }
            }
        }

        let target = versions
            .iter_mut()
            .find(|v| v.version == version)
            .ok_or_else(|| {
                SpamOpsError::Registry(format!("unknown version {version} of {name}"))
            })?;
        target.stage = stage;
        Ok(())
    }
}
