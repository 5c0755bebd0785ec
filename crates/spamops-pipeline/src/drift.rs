//! Text-length drift detection

use tracing::{info, warn};

/// Compares a batch's mean text length against a configured baseline.
///
/// Baseline and threshold are fixed at construction; the monitor holds no
/// other state. Long-lived deployments should treat the baseline as
/// externally refreshed configuration and construct a fresh monitor per run.
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    baseline_mean: f64,
    threshold: f64,
}

impl DriftMonitor {
    pub fn new(baseline_mean: f64, threshold: f64) -> Self {
        Self {
            baseline_mean,
            threshold,
        }
    }

    /// Check a batch of texts for mean-length drift.
    ///
    /// Returns `true` iff the absolute difference between the baseline and
    /// the batch mean strictly exceeds the threshold. An empty batch carries
    /// no distribution evidence: it logs a warning and reports no drift.
    pub fn check<S: AsRef<str>>(&self, texts: &[S]) -> bool {
        if texts.is_empty() {
            warn!("Drift check received an empty batch; reporting no drift");
            return false;
        }

        let total: usize = texts.iter().map(|t| t.as_ref().chars().count()).sum();
        let current_mean = total as f64 / texts.len() as f64;
        let drift = (self.baseline_mean - current_mean).abs();

        info!(baseline_mean = self.baseline_mean, "Drift baseline");
        info!(current_mean, "Drift current batch");

        if drift > self.threshold {
            warn!(
                drift,
                threshold = self.threshold,
                "Text length drift detected"
            );
            return true;
        }

        false
    }
}
