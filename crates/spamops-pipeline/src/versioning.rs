//! Dataset version identifiers

use spamops_common::hashing::dataset_hash;
use spamops_common::types::Dataset;

/// Computes content-hash version identifiers for cleaned datasets.
///
/// The identifier is a pure function of the dataset's values and row order,
/// so re-running the pipeline over unchanged data always lands on the same
/// versioned output location.
pub struct DataVersioner;

impl DataVersioner {
    pub fn compute_hash(dataset: &Dataset) -> String {
        dataset_hash(dataset)
    }
}
