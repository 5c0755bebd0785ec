//! Classification metrics

use spamops_common::types::Label;

/// Binary confusion counts for a positive label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl ConfusionCounts {
    pub fn from_labels(y_true: &[Label], y_pred: &[Label], pos_label: Label) -> Self {
        let mut counts = ConfusionCounts::default();
        for (truth, pred) in y_true.iter().zip(y_pred.iter()) {
            match (*truth == pos_label, *pred == pos_label) {
                (true, true) => counts.true_positives += 1,
                (false, true) => counts.false_positives += 1,
                (true, false) => counts.false_negatives += 1,
                (false, false) => counts.true_negatives += 1,
            }
        }
        counts
    }

    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }

    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

/// F1 score with an explicit positive label.
///
/// Zero denominators (no predicted or no actual positives) yield 0.0 rather
/// than NaN.
pub fn f1_score(y_true: &[Label], y_pred: &[Label], pos_label: Label) -> f64 {
    ConfusionCounts::from_labels(y_true, y_pred, pos_label).f1()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use spamops_common::types::Label::{Ham, Spam};

    #[test]
    fn perfect_predictions_score_one() {
        let y = vec![Spam, Ham, Spam, Ham];
        assert_eq!(f1_score(&y, &y, Spam), 1.0);
    }

    #[test]
    fn known_confusion_counts() {
        // tp=2, fp=1, fn=1 -> precision 2/3, recall 2/3, f1 2/3
        let y_true = vec![Spam, Spam, Spam, Ham, Ham];
        let y_pred = vec![Spam, Spam, Ham, Spam, Ham];
        let counts = ConfusionCounts::from_labels(&y_true, &y_pred, Spam);
        assert_eq!(counts.true_positives, 2);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.false_negatives, 1);
        assert_eq!(counts.true_negatives, 1);
        assert!((f1_score(&y_true, &y_pred, Spam) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_positives_anywhere_scores_zero() {
        let y_true = vec![Ham, Ham];
        let y_pred = vec![Ham, Ham];
        assert_eq!(f1_score(&y_true, &y_pred, Spam), 0.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(f1_score(&[], &[], Spam), 0.0);
    }
}
