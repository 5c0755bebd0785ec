//! Common types used across SpamOps

use crate::error::SpamOpsError;
use serde::{Deserialize, Serialize};

/// Classification label for a message.
///
/// The valid label set is closed: everything that is not `ham` or `spam` is
/// rejected at the transform stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }
}

impl std::str::FromStr for Label {
    type Err = SpamOpsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            other => Err(SpamOpsError::InvalidLabel(other.to_string())),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cleaned row: a validated label and a normalized message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub label: Label,
    pub text: String,
}

impl Record {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// A cleaned, ordered dataset.
///
/// Produced by the transform stage and immutable afterwards. Row order is
/// significant: the content hash covers values and ordering alike.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Message texts in row order.
    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    /// Labels in row order.
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().map(|r| r.label).collect()
    }
}

/// A raw table as read from the source, before any cleaning.
///
/// Columns are whatever the source had; `None` cells are missing values
/// (absent or empty CSV fields).
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Counters emitted by the transform stage for observability.
///
/// Dropped rows are a data-quality signal, not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Rows dropped for missing values or exact duplication.
    pub dropped_rows: usize,
    /// Rows dropped for a label outside the valid set.
    pub dropped_invalid_labels: usize,
}

/// Lifecycle stage of a registered model version.
///
/// Transitions beyond `Staging` are managed by the external registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    None,
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = SpamOpsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "None" => Ok(Stage::None),
            "Staging" => Ok(Stage::Staging),
            "Production" => Ok(Stage::Production),
            "Archived" => Ok(Stage::Archived),
            other => Err(SpamOpsError::Parse(format!("unknown stage: {other}"))),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A model version as reported by the registry collaborator.
///
/// The version number and stage are owned by the registry; this is a
/// read-side handle only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredVersion {
    pub name: String,
    pub version: u32,
    pub stage: Stage,
    pub source: String,
    pub run_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_through_strings() {
        assert_eq!("ham".parse::<Label>().unwrap(), Label::Ham);
        assert_eq!("spam".parse::<Label>().unwrap(), Label::Spam);
        assert_eq!(Label::Spam.to_string(), "spam");
    }

    #[test]
    fn label_rejects_anything_outside_the_valid_set() {
        assert!("Ham".parse::<Label>().is_err());
        assert!("xyz".parse::<Label>().is_err());
        assert!("".parse::<Label>().is_err());
    }

    #[test]
    fn stage_parses_registry_strings() {
        assert_eq!("None".parse::<Stage>().unwrap(), Stage::None);
        assert_eq!("Staging".parse::<Stage>().unwrap(), Stage::Staging);
        assert!("staging".parse::<Stage>().is_err());
    }
}
