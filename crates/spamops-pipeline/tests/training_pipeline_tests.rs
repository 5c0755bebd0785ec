//! Training and evaluation over a local store with in-memory collaborators
//!
//! Exercises the full flow behind the registry gate: fit, predictions file,
//! artifact registration, and promotion of the freshly registered version.

use spamops_common::types::{Dataset, Label, Record, Stage};
use spamops_pipeline::config::Settings;
use spamops_pipeline::dataset_io::{dataset_to_parquet, predictions_from_parquet};
use spamops_pipeline::evaluate::EvaluationPipeline;
use spamops_pipeline::model::SpamHamPipeline;
use spamops_pipeline::registry::{InMemoryRegistry, ModelRegistry};
use spamops_pipeline::store::DataStore;
use spamops_pipeline::tracking::{InMemoryTracking, TrackingClient};
use spamops_pipeline::train::TrainingPipeline;
use spamops_pipeline::PromotionOutcome;

fn training_dataset() -> Dataset {
    let spam = [
        "win cash prize now",
        "free prize claim cash",
        "win free cash today",
        "claim your free prize",
        "urgent prize win cash",
        "free cash win claim",
    ];
    let ham = [
        "see you at lunch",
        "meeting moved to monday",
        "can you call me later",
        "dinner at home tonight",
        "running late see you soon",
        "call me when you arrive",
    ];
    let records = spam
        .iter()
        .map(|t| Record::new(Label::Spam, *t))
        .chain(ham.iter().map(|t| Record::new(Label::Ham, *t)))
        .collect();
    Dataset::new(records)
}

fn test_settings(dir: &tempfile::TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.data.processed_data_base =
        dir.path().join("processed").to_string_lossy().to_string();
    settings.data.models_base = dir.path().join("models").to_string_lossy().to_string();
    settings.model.epochs = 400;
    settings
}

async fn write_dataset(settings: &Settings, dataset: &Dataset) -> String {
    let path = format!("{}/abc123/data.parquet", settings.data.processed_data_base);
    let store = DataStore::new();
    store
        .put(&path, dataset_to_parquet(dataset).unwrap())
        .await
        .unwrap();
    path
}

#[tokio::test]
async fn training_registers_an_unstaged_version_with_its_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    let data_path = write_dataset(&settings, &training_dataset()).await;

    let store = DataStore::new();
    let tracking = InMemoryTracking::new();
    let registry = InMemoryRegistry::new();
    let run = tracking.start_run("training").await.unwrap();

    let outcome = TrainingPipeline::new(&settings, &store, &tracking, &registry)
        .run(&run, &data_path)
        .await
        .unwrap();

    // The corpus is cleanly separable, so the training-set fit is exact.
    assert_eq!(outcome.f1, 1.0);
    assert_eq!(outcome.registered.version, 1);
    assert_eq!(outcome.registered.stage, Stage::None);

    // Predictions sit next to the dataset and carry one row per record.
    assert_eq!(
        outcome.predictions_path,
        data_path.replace("data.parquet", "data_with_preds.parquet")
    );
    let frame =
        predictions_from_parquet(store.get(&outcome.predictions_path).await.unwrap()).unwrap();
    assert_eq!(frame.rows.len(), 12);

    // The registered artifact is a loadable pipeline.
    let artifact = store.get(&outcome.registered.source).await.unwrap();
    let model = SpamHamPipeline::from_bytes(&artifact).unwrap();
    assert_eq!(model.predict_one("free cash prize"), Label::Spam);

    let params = tracking.params_for(&run);
    assert!(params.contains(&("model_type".to_string(), "tfidf_logreg".to_string())));
    let metrics = tracking.metrics_for(&run);
    assert!(metrics.contains(&("f1_score".to_string(), 1.0)));
}

#[tokio::test]
async fn evaluation_promotes_the_version_registered_by_training() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    let data_path = write_dataset(&settings, &training_dataset()).await;

    let store = DataStore::new();
    let tracking = InMemoryTracking::new();
    let registry = InMemoryRegistry::new();

    let train_run = tracking.start_run("training").await.unwrap();
    let trained = TrainingPipeline::new(&settings, &store, &tracking, &registry)
        .run(&train_run, &data_path)
        .await
        .unwrap();

    let eval_run = tracking.start_run("evaluation").await.unwrap();
    let evaluated = EvaluationPipeline::new(&settings, &store, &tracking, &registry)
        .run(&eval_run, &trained.predictions_path)
        .await
        .unwrap();

    match evaluated.promotion {
        PromotionOutcome::Promoted(version) => {
            assert_eq!(version.version, trained.registered.version);
        },
        other => panic!("expected promotion, got {other:?}"),
    }
    assert_eq!(
        registry.stage_of(&settings.model.name, trained.registered.version),
        Some(Stage::Staging)
    );

    // A second training run leaves Staging to the promoted version and
    // queues its own version in stage None.
    let second_run = tracking.start_run("training").await.unwrap();
    let second = TrainingPipeline::new(&settings, &store, &tracking, &registry)
        .run(&second_run, &data_path)
        .await
        .unwrap();
    assert_eq!(second.registered.version, 2);
    assert_eq!(
        registry
            .latest_versions(&settings.model.name, &[Stage::None])
            .await
            .unwrap()[0]
            .version,
        2
    );
}
