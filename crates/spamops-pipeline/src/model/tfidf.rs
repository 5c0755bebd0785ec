//! TF-IDF text vectorization

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// TF-IDF vectorizer over a capped vocabulary.
///
/// Tokens are lowercased alphanumeric runs of at least two characters. The
/// vocabulary keeps the `max_features` most document-frequent terms (ties
/// broken alphabetically so fitting is deterministic), IDF is smoothed, and
/// output vectors are L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() >= 2)
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and IDF weights from a corpus.
    pub fn fit(&mut self, texts: &[&str]) {
        let n_docs = texts.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let mut seen = HashSet::new();
            for token in Self::tokenize(text) {
                if seen.insert(token.clone()) {
                    *document_frequency.entry(token).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<(String, usize)> = document_frequency.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(self.max_features);
        // Stable feature indices: alphabetical within the retained set.
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(index, (token, _))| (token.clone(), index))
            .collect();
        self.idf = terms
            .iter()
            .map(|(_, df)| ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0)
            .collect();
    }

    /// Transform one text into a sparse, L2-normalized feature vector.
    ///
    /// Tokens outside the fitted vocabulary are ignored.
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in Self::tokenize(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }

        vector.sort_by_key(|(index, _)| *index);
        vector
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn fit_builds_a_capped_vocabulary() {
        let mut vectorizer = TfidfVectorizer::new(2);
        vectorizer.fit(&["win cash win", "cash now", "cash prize"]);
        // "cash" has df 3; the df-1 tie resolves alphabetically to "now".
        assert_eq!(vectorizer.vocabulary_len(), 2);
        assert!(!vectorizer.transform("cash").is_empty());
        assert!(!vectorizer.transform("now").is_empty());
        assert!(vectorizer.transform("prize win").is_empty());
    }

    #[test]
    fn unknown_tokens_produce_an_empty_vector() {
        let mut vectorizer = TfidfVectorizer::new(10);
        vectorizer.fit(&["hello world"]);
        assert!(vectorizer.transform("zebra quagga").is_empty());
    }

    #[test]
    fn vectors_are_l2_normalized() {
        let mut vectorizer = TfidfVectorizer::new(10);
        vectorizer.fit(&["hello world", "hello there"]);
        let vector = vectorizer.transform("hello world world");
        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        let mut vectorizer = TfidfVectorizer::new(10);
        vectorizer.fit(&["a b see you"]);
        assert_eq!(vectorizer.vocabulary_len(), 2);
    }
}
