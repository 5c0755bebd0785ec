//! `spamops predict` - smoke-test the prediction service

use crate::error::{CliError, Result};
use serde_json::json;
use tracing::info;

pub async fn run(server_url: &str, text: &str) -> Result<()> {
    let url = format!("{}/predict", server_url.trim_end_matches('/'));
    info!("Invoking {url}");

    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "text": text }))
        .send()
        .await
        .map_err(|e| CliError::Service(e.to_string()))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| CliError::Service(e.to_string()))?;

    if !status.is_success() {
        return Err(CliError::Service(format!("{status}: {body}")));
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
