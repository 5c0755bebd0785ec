//! SpamOps Prediction Service - Main entry point

use anyhow::Result;
use spamops_common::logging::{init_logging, LogConfig};
use spamops_common::SpamOpsError;
use spamops_pipeline::config::Settings;
use spamops_pipeline::model::SpamHamPipeline;
use spamops_pipeline::registry::{resolve_model_version, RestRegistry};
use spamops_pipeline::store::DataStore;
use spamops_server::{router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

/// Default bind host for the prediction service.
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default bind port for the prediction service.
const DEFAULT_SERVER_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("spamops-server".to_string())
        .filter_directives("spamops_server=debug,tower_http=debug".to_string())
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    init_logging(&log_config)?;

    info!("Starting SpamOps prediction service");

    let settings = Settings::load()?;
    let model = load_staging_model(&settings).await;
    let state = AppState {
        model: model.map(Arc::new),
    };

    let host =
        std::env::var("SPAMOPS_SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());
    let port = std::env::var("SPAMOPS_SERVER_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SERVER_PORT);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!("Prediction service listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Prediction service stopped");
    Ok(())
}

/// Resolve and load the current Staging model.
///
/// Startup tolerates a missing or unloadable model; the service then reports
/// `model_not_loaded` from its health endpoint until restarted.
async fn load_staging_model(settings: &Settings) -> Option<SpamHamPipeline> {
    let model_uri = format!("models:/{}/Staging", settings.model.name);
    info!("Loading model from {model_uri}");

    match try_load(settings, &model_uri).await {
        Ok(Some(model)) => {
            info!("Model loaded successfully");
            Some(model)
        },
        Ok(None) => {
            warn!("No model version currently in Staging");
            None
        },
        Err(e) => {
            warn!(error = %e, "Failed to load model");
            None
        },
    }
}

async fn try_load(
    settings: &Settings,
    model_uri: &str,
) -> spamops_common::Result<Option<SpamHamPipeline>> {
    let registry = RestRegistry::new(&settings.tracking.uri)?;
    let Some(version) = resolve_model_version(&registry, model_uri).await? else {
        return Ok(None);
    };

    info!(
        version = version.version,
        source = %version.source,
        "Resolved Staging model version"
    );

    let store = DataStore::new();
    let bytes = store
        .get(&version.source)
        .await
        .map_err(|e| SpamOpsError::Artifact(format!("{}: {e:#}", version.source)))?;
    Ok(Some(SpamHamPipeline::from_bytes(&bytes)?))
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
