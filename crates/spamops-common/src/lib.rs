//! SpamOps Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the SpamOps project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all SpamOps workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Hashing**: Dataset content fingerprints used as version identifiers
//! - **Types**: Shared domain types and data structures
//!
//! # Example
//!
//! ```no_run
//! use spamops_common::hashing::dataset_hash;
//! use spamops_common::types::Dataset;
//!
//! fn version_of(dataset: &Dataset) -> String {
//!     dataset_hash(dataset)
//! }
//! ```

pub mod error;
pub mod hashing;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SpamOpsError};
