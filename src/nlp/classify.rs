//! Sentiment and zero-shot classifier seams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Top label of a text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f64,
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Return the highest scoring label for `text`.
    async fn classify(&self, text: &str) -> Result<SentimentScore, InferenceError>;
}

/// Ranked zero-shot result; `scores[i]` belongs to `labels[i]`, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroShotResult {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotResult {
    /// Pairs sorted by descending score regardless of how the backend ordered them.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut pairs: Vec<(&str, f64)> = self
            .labels
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }
}

#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotResult, InferenceError>;
}
