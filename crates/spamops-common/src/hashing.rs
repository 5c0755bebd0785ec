//! Content hashing for dataset versioning

use crate::types::Dataset;
use sha2::{Digest, Sha256};

/// Field and record separators fed into the hasher so that cell boundaries
/// cannot be forged by moving bytes between adjacent fields.
const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// Compute the content hash of a cleaned dataset.
///
/// The hash covers every cell value and the row order; two datasets with
/// identical content (including ordering) always produce the same hex string,
/// and any change to a value or to the ordering produces a different one.
/// Used as the dataset version identifier and content-addressed store key.
pub fn dataset_hash(dataset: &Dataset) -> String {
    let mut hasher = Sha256::new();
    for record in &dataset.records {
        hasher.update(record.label.as_str().as_bytes());
        hasher.update([FIELD_SEP]);
        hasher.update(record.text.as_bytes());
        hasher.update([RECORD_SEP]);
    }
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 checksum of a byte buffer.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{Label, Record};

    fn dataset(rows: &[(Label, &str)]) -> Dataset {
        Dataset::new(
            rows.iter()
                .map(|(label, text)| Record::new(*label, *text))
                .collect(),
        )
    }

    #[test]
    fn identical_content_hashes_identically() {
        let a = dataset(&[(Label::Ham, "hi there"), (Label::Spam, "win cash")]);
        let b = dataset(&[(Label::Ham, "hi there"), (Label::Spam, "win cash")]);
        assert_eq!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn any_cell_change_changes_the_hash() {
        let a = dataset(&[(Label::Ham, "hi there")]);
        let b = dataset(&[(Label::Ham, "hi therf")]);
        let c = dataset(&[(Label::Spam, "hi there")]);
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
        assert_ne!(dataset_hash(&a), dataset_hash(&c));
    }

    #[test]
    fn row_order_is_part_of_the_identity() {
        let a = dataset(&[(Label::Ham, "first"), (Label::Spam, "second")]);
        let b = dataset(&[(Label::Spam, "second"), (Label::Ham, "first")]);
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn cell_boundaries_cannot_be_shifted() {
        let a = dataset(&[(Label::Ham, "ab"), (Label::Ham, "c")]);
        let b = dataset(&[(Label::Ham, "a"), (Label::Ham, "bc")]);
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
