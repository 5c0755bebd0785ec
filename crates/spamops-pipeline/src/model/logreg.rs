//! Binary logistic regression over sparse feature vectors

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Full-batch gradient-descent logistic regression.
///
/// Weights are initialized from a seeded RNG so identical inputs and
/// `random_state` always train to identical parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
    random_state: u64,
    epochs: usize,
    learning_rate: f64,
}

impl LogisticRegression {
    pub fn new(random_state: u64, epochs: usize, learning_rate: f64) -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            random_state,
            epochs,
            learning_rate,
        }
    }

    fn decision(&self, sample: &[(usize, f64)]) -> f64 {
        let z: f64 = sample
            .iter()
            .map(|&(index, value)| self.weights[index] * value)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    /// Fit to sparse samples with targets in {0.0, 1.0}.
    pub fn fit(&mut self, samples: &[Vec<(usize, f64)>], targets: &[f64], n_features: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        self.weights = (0..n_features).map(|_| rng.gen_range(-0.01..0.01)).collect();
        self.bias = 0.0;

        if samples.is_empty() {
            return;
        }
        let n = samples.len() as f64;

        for _ in 0..self.epochs {
            let mut weight_grad = vec![0.0; n_features];
            let mut bias_grad = 0.0;

            for (sample, &target) in samples.iter().zip(targets.iter()) {
                let error = self.decision(sample) - target;
                for &(index, value) in sample {
                    weight_grad[index] += error * value;
                }
                bias_grad += error;
            }

            for (weight, grad) in self.weights.iter_mut().zip(weight_grad.iter()) {
                *weight -= self.learning_rate * grad / n;
            }
            self.bias -= self.learning_rate * bias_grad / n;
        }
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, sample: &[(usize, f64)]) -> f64 {
        self.decision(sample)
    }

    /// Positive-class decision at the 0.5 boundary.
    pub fn predict(&self, sample: &[(usize, f64)]) -> bool {
        self.predict_proba(sample) >= 0.5
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn separable_samples() -> (Vec<Vec<(usize, f64)>>, Vec<f64>) {
        // Feature 0 fires for the positive class, feature 1 for the negative.
        let samples = vec![
            vec![(0, 1.0)],
            vec![(0, 0.9)],
            vec![(0, 1.1)],
            vec![(1, 1.0)],
            vec![(1, 0.8)],
            vec![(1, 1.2)],
        ];
        let targets = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        (samples, targets)
    }

    #[test]
    fn fits_a_separable_problem() {
        let (samples, targets) = separable_samples();
        let mut model = LogisticRegression::new(42, 500, 0.5);
        model.fit(&samples, &targets, 2);

        for (sample, target) in samples.iter().zip(targets.iter()) {
            assert_eq!(model.predict(sample), *target == 1.0);
        }
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let (samples, targets) = separable_samples();
        let mut a = LogisticRegression::new(7, 50, 0.5);
        let mut b = LogisticRegression::new(7, 50, 0.5);
        a.fit(&samples, &targets, 2);
        b.fit(&samples, &targets, 2);
        assert_eq!(a.predict_proba(&samples[0]), b.predict_proba(&samples[0]));
    }

    #[test]
    fn empty_training_set_leaves_an_unbiased_model() {
        let mut model = LogisticRegression::new(42, 10, 0.5);
        model.fit(&[], &[], 3);
        let proba = model.predict_proba(&[(0, 1.0)]);
        assert!((proba - 0.5).abs() < 0.01);
    }
}
