//! The model promotion gate

use crate::registry::ModelRegistry;
use spamops_common::types::{RegisteredVersion, Stage};
use spamops_common::Result;
use tracing::{info, warn};

/// Outcome of a promotion attempt.
///
/// `NoCandidate` is a successful no-op, not an error; `QualityTooLow` is the
/// gate refusing to touch the registry at all.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// Exactly this version moved from `None` to `Staging`.
    Promoted(RegisteredVersion),
    /// Nothing is waiting in stage `None`.
    NoCandidate,
    /// The evaluation score did not clear the configured threshold.
    QualityTooLow { score: f64, threshold: f64 },
}

/// Gate that moves the newest unstaged model version into `Staging` when the
/// evaluation score clears the quality threshold.
///
/// The single-active-staging invariant is enforced by archiving any previous
/// `Staging` holder as part of the same transition.
pub struct ModelPromoter<'a> {
    registry: &'a dyn ModelRegistry,
    model_name: &'a str,
    f1_threshold: f64,
}

impl<'a> ModelPromoter<'a> {
    pub fn new(registry: &'a dyn ModelRegistry, model_name: &'a str, f1_threshold: f64) -> Self {
        Self {
            registry,
            model_name,
            f1_threshold,
        }
    }

    pub async fn promote_if_valid(&self, score: f64) -> Result<PromotionOutcome> {
        if score < self.f1_threshold {
            warn!(
                score,
                threshold = self.f1_threshold,
                "Model does not meet quality threshold"
            );
            return Ok(PromotionOutcome::QualityTooLow {
                score,
                threshold: self.f1_threshold,
            });
        }

        let candidates = self
            .registry
            .latest_versions(self.model_name, &[Stage::None])
            .await?;

        let Some(candidate) = candidates.into_iter().next() else {
            info!(
                model = self.model_name,
                "No versions found in stage 'None'; nothing to promote"
            );
            return Ok(PromotionOutcome::NoCandidate);
        };

        info!(
            model = self.model_name,
            version = candidate.version,
            "Promoting model version to Staging"
        );

        self.registry
            .transition_stage(self.model_name, candidate.version, Stage::Staging, true)
            .await?;

        Ok(PromotionOutcome::Promoted(RegisteredVersion {
            stage: Stage::Staging,
            ..candidate
        }))
    }
}
