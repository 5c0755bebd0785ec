//! SpamOps Prediction Service
//!
//! A small HTTP surface over the promoted classifier:
//!
//! - `GET /health` reports whether a model is loaded
//! - `POST /predict` with `{"text": ...}` returns the classification
//!
//! The model is resolved once at startup from the registry's `Staging`
//! version; a missing model keeps the service up with health reporting
//! `model_not_loaded`.

pub mod error;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use error::AppError;
use serde_json::{json, Value};
use spamops_pipeline::model::SpamHamPipeline;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone, Default)]
pub struct AppState {
    pub model: Option<Arc<SpamHamPipeline>>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = if state.model.is_some() {
        "ready"
    } else {
        "model_not_loaded"
    };
    Json(json!({ "status": status }))
}

async fn predict(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, AppError> {
    let Some(model) = state.model else {
        return Err(AppError::ModelNotLoaded);
    };

    let text = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|payload| {
            payload
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .ok_or_else(|| AppError::BadRequest("Missing 'text' in request body".to_string()))?;

    let prediction = model.predict_one(&text);
    Ok(Json(json!({
        "text": text,
        "prediction": prediction.to_string(),
    })))
}
