//! SpamOps Pipeline Library
//!
//! Core pipeline stages for the spam/ham classifier: ETL with content-hash
//! dataset versioning, text-length drift monitoring, model training and
//! evaluation, and the staged promotion gate against the model registry.
//!
//! # Pipeline stages
//!
//! - **ETL**: extract the raw labeled corpus, clean it into the validated
//!   `label`/`text` schema, and persist it under its content hash
//! - **Training**: fit the TF-IDF + logistic regression pipeline and register
//!   the resulting model version
//! - **Evaluation**: score predictions and promote the candidate version to
//!   `Staging` when the quality gate passes
//!
//! # Example
//!
//! ```no_run
//! use spamops_pipeline::config::Settings;
//! use spamops_pipeline::etl::EtlPipeline;
//! use spamops_pipeline::store::DataStore;
//! use spamops_pipeline::tracking::{InMemoryTracking, TrackingClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = DataStore::new();
//!     let tracking = InMemoryTracking::default();
//!     let run = tracking.start_run("etl").await?;
//!     let output = EtlPipeline::new(&settings, &store, &tracking).run(&run).await?;
//!     println!("{output}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset_io;
pub mod drift;
pub mod etl;
pub mod evaluate;
pub mod metrics;
pub mod model;
pub mod promote;
pub mod registry;
pub mod store;
pub mod tracking;
pub mod train;
pub mod versioning;

// Re-export commonly used types
pub use config::Settings;
pub use promote::{ModelPromoter, PromotionOutcome};
pub use versioning::DataVersioner;
