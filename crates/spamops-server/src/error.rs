//! Prediction service error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the prediction endpoints.
///
/// Every error renders as the service's `{"error": ...}` body shape.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ModelNotLoaded => {
                tracing::error!("Prediction requested but no model is loaded");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            },
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
