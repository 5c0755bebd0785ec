//! The TF-IDF + logistic regression model pipeline
//!
//! The trained pipeline is the registered model artifact: it serializes to
//! JSON and is reloaded by the prediction service.

pub mod logreg;
pub mod tfidf;

use crate::config::ModelConfig;
use logreg::LogisticRegression;
use serde::{Deserialize, Serialize};
use spamops_common::types::Label;
use spamops_common::Result;
use tfidf::TfidfVectorizer;

/// Two-stage classifier: TF-IDF vectorization feeding logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamHamPipeline {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl SpamHamPipeline {
    /// Assemble an untrained pipeline from model configuration.
    pub fn build(config: &ModelConfig) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(config.max_features),
            classifier: LogisticRegression::new(
                config.random_state,
                config.epochs,
                config.learning_rate,
            ),
        }
    }

    /// Fit both stages on a labeled corpus.
    pub fn fit(&mut self, texts: &[&str], labels: &[Label]) {
        self.vectorizer.fit(texts);
        let samples: Vec<Vec<(usize, f64)>> =
            texts.iter().map(|t| self.vectorizer.transform(t)).collect();
        let targets: Vec<f64> = labels
            .iter()
            .map(|l| if *l == Label::Spam { 1.0 } else { 0.0 })
            .collect();
        self.classifier
            .fit(&samples, &targets, self.vectorizer.vocabulary_len());
    }

    pub fn predict_one(&self, text: &str) -> Label {
        let sample = self.vectorizer.transform(text);
        if self.classifier.predict(&sample) {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    pub fn predict(&self, texts: &[&str]) -> Vec<Label> {
        texts.iter().map(|t| self.predict_one(t)).collect()
    }

    /// Serialize the trained pipeline as the JSON model artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Load a pipeline back from its JSON artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
