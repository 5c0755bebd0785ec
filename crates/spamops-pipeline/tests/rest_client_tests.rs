//! Tracking and registry REST clients against a mock server

use serde_json::json;
use spamops_common::types::Stage;
use spamops_pipeline::registry::{ModelRegistry, RestRegistry};
use spamops_pipeline::tracking::{RestTracking, RunId, TrackingClient};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPERIMENT: &str = "spam-ham-classifier";

#[tokio::test]
async fn start_run_resolves_an_existing_experiment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/mlflow/experiments/get-by-name"))
        .and(query_param("experiment_name", EXPERIMENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "experiment": { "experiment_id": "42" } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/create"))
        .and(body_partial_json(json!({ "experiment_id": "42", "run_name": "etl" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "run": { "info": { "run_id": "run-123" } } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tracking = RestTracking::new(&server.uri(), EXPERIMENT).unwrap();
    let run = tracking.start_run("etl").await.unwrap();
    assert_eq!(run.as_str(), "run-123");
}

#[tokio::test]
async fn start_run_creates_a_missing_experiment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/2.0/mlflow/experiments/get-by-name"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error_code": "RESOURCE_DOES_NOT_EXIST" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/experiments/create"))
        .and(body_partial_json(json!({ "name": EXPERIMENT })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "experiment_id": "7" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/create"))
        .and(body_partial_json(json!({ "experiment_id": "7" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "run": { "info": { "run_id": "run-7" } } })),
        )
        .mount(&server)
        .await;

    let tracking = RestTracking::new(&server.uri(), EXPERIMENT).unwrap();
    let run = tracking.start_run("training").await.unwrap();
    assert_eq!(run.as_str(), "run-7");
}

#[tokio::test]
async fn params_and_metrics_are_logged_against_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/log-parameter"))
        .and(body_partial_json(json!({
            "run_id": "run-1",
            "key": "dataset_version",
            "value": "abc123",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/log-metric"))
        .and(body_partial_json(json!({
            "run_id": "run-1",
            "key": "f1_score",
            "value": 0.9,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/update"))
        .and(body_partial_json(json!({ "run_id": "run-1", "status": "FINISHED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let tracking = RestTracking::new(&server.uri(), EXPERIMENT).unwrap();
    let run = RunId::new("run-1");
    tracking
        .log_param(&run, "dataset_version", "abc123")
        .await
        .unwrap();
    tracking.log_metric(&run, "f1_score", 0.9).await.unwrap();
    tracking.end_run(&run).await.unwrap();
}

#[tokio::test]
async fn tracking_errors_surface_the_server_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/runs/log-parameter"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error_code": "INTERNAL_ERROR" })),
        )
        .mount(&server)
        .await;

    let tracking = RestTracking::new(&server.uri(), EXPERIMENT).unwrap();
    let result = tracking.log_param(&RunId::new("run-1"), "k", "v").await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("INTERNAL_ERROR"), "unexpected error: {err}");
}

#[tokio::test]
async fn latest_versions_parses_the_registry_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/registered-models/get-latest-versions"))
        .and(body_partial_json(json!({
            "name": "SpamHamClassifier",
            "stages": ["None"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_versions": [{
                "name": "SpamHamClassifier",
                "version": "3",
                "current_stage": "None",
                "source": "s3://spamops-ml-data/models/SpamHamClassifier/run-3/model.json",
                "run_id": "run-3",
            }]
        })))
        .mount(&server)
        .await;

    let registry = RestRegistry::new(&server.uri()).unwrap();
    let versions = registry
        .latest_versions("SpamHamClassifier", &[Stage::None])
        .await
        .unwrap();

    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, 3);
    assert_eq!(versions[0].stage, Stage::None);
    assert_eq!(versions[0].run_id.as_deref(), Some("run-3"));
}

#[tokio::test]
async fn transition_requests_archive_existing_staging_versions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/model-versions/transition-stage"))
        .and(body_partial_json(json!({
            "name": "SpamHamClassifier",
            "version": "3",
            "stage": "Staging",
            "archive_existing_versions": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = RestRegistry::new(&server.uri()).unwrap();
    registry
        .transition_stage("SpamHamClassifier", 3, Stage::Staging, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn ensure_registered_tolerates_an_existing_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/2.0/mlflow/registered-models/create"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "RESOURCE_ALREADY_EXISTS",
            "message": "Registered Model (name=SpamHamClassifier) already exists.",
        })))
        .mount(&server)
        .await;

    let registry = RestRegistry::new(&server.uri()).unwrap();
    registry.ensure_registered("SpamHamClassifier").await.unwrap();
}
