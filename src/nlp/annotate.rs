//! Per-utterance sentiment and intent annotation.

use std::fmt;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::transcript::Utterance;

use super::{
    classify::{SentimentClassifier, ZeroShotClassifier},
    InferenceError,
};

/// Closed set of intents offered to the zero-shot classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentLabel {
    #[serde(rename = "Seeking reassurance")]
    SeekingReassurance,
    #[serde(rename = "Reporting symptoms")]
    ReportingSymptoms,
    #[serde(rename = "Expressing concern")]
    ExpressingConcern,
    #[serde(rename = "Expressing gratitude")]
    ExpressingGratitude,
    #[serde(rename = "Reporting outcome")]
    ReportingOutcome,
}

impl IntentLabel {
    pub const ALL: [Self; 5] = [
        Self::SeekingReassurance,
        Self::ReportingSymptoms,
        Self::ExpressingConcern,
        Self::ExpressingGratitude,
        Self::ReportingOutcome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeekingReassurance => "Seeking reassurance",
            Self::ReportingSymptoms => "Reporting symptoms",
            Self::ExpressingConcern => "Expressing concern",
            Self::ExpressingGratitude => "Expressing gratitude",
            Self::ReportingOutcome => "Reporting outcome",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }

    /// Candidate labels in the order they are sent to the classifier.
    pub fn candidates() -> [&'static str; 5] {
        Self::ALL.map(|l| l.as_str())
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `sentiment.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedUtterance {
    pub text: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub intent: IntentLabel,
    pub intent_score: f64,
}

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("models not loaded: sentiment and intent classifiers are both required")]
    ModelsUnavailable,
    #[error("classifying utterance {index}: {source}")]
    Inference {
        index: usize,
        #[source]
        source: InferenceError,
    },
    #[error("intent classifier ranked no candidate label for utterance {index}")]
    NoCandidateIntent { index: usize },
}

/// Annotate every utterance, or fail the whole batch.
///
/// Up to `concurrency` utterances are in flight at once; results keep input order.
#[instrument(skip_all, fields(utterances = utterances.len()))]
pub async fn annotate(
    sentiment: Option<&dyn SentimentClassifier>,
    intent: Option<&dyn ZeroShotClassifier>,
    utterances: &[Utterance],
    concurrency: usize,
) -> Result<Vec<AnnotatedUtterance>, AnnotateError> {
    let (Some(sentiment), Some(intent)) = (sentiment, intent) else {
        return Err(AnnotateError::ModelsUnavailable);
    };
    stream::iter(utterances.iter().cloned().enumerate())
        .map(|(index, utterance)| async move {
            annotate_one(sentiment, intent, index, &utterance).await
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

async fn annotate_one(
    sentiment: &dyn SentimentClassifier,
    intent: &dyn ZeroShotClassifier,
    index: usize,
    utterance: &Utterance,
) -> Result<AnnotatedUtterance, AnnotateError> {
    let text = utterance.as_str();
    let wrap = |source| AnnotateError::Inference { index, source };

    let mood = sentiment.classify(text).await.map_err(wrap)?;
    let ranking = intent
        .classify(text, &IntentLabel::candidates())
        .await
        .map_err(wrap)?;
    let (label, score) = ranking
        .ranked()
        .into_iter()
        .find_map(|(label, score)| IntentLabel::parse(label).map(|l| (l, score)))
        .ok_or(AnnotateError::NoCandidateIntent { index })?;

    debug!(index, sentiment = %mood.label, intent = %label, "annotated utterance");
    Ok(AnnotatedUtterance {
        text: text.to_string(),
        sentiment: mood.label,
        sentiment_score: round2(mood.score),
        intent: label,
        intent_score: round2(score),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
