//! Natural language processing orchestration layer.

pub mod annotate;
pub mod classify;
pub mod hosted;
pub mod ner;
pub mod qa;
pub mod registry;
pub mod summary;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{config::AnalysisConfig, transcript};

use self::{
    annotate::AnnotatedUtterance, registry::ModelRegistry, summary::ClinicalSummary,
};

/// Failure talking to, or building, an NLP collaborator.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected inference payload: {0}")]
    Payload(String),
}

/// Outcome of the sentiment/intent step for one transcript.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentOutcome {
    Annotated { utterances: Vec<AnnotatedUtterance> },
    NoPatientDialogue,
    Failed { error: String },
}

/// Everything computed from a transcript without the generative model.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: ClinicalSummary,
    pub sentiment: SentimentOutcome,
}

/// Run the clinical summary and the sentiment/intent annotation side by side.
#[instrument(skip_all, fields(chars = transcript.len()))]
pub async fn analyze(
    registry: &ModelRegistry,
    transcript: &str,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let (summary, sentiment) = tokio::join!(
        summary::summarize(registry, transcript, config),
        annotate_transcript(registry, transcript, config),
    );
    info!(
        symptoms = summary.symptoms.len(),
        treatment = summary.treatment.len(),
        "analysis complete"
    );
    AnalysisReport { summary, sentiment }
}

/// Isolate patient turns and annotate them, folding failures into the outcome.
pub async fn annotate_transcript(
    registry: &ModelRegistry,
    transcript: &str,
    config: &AnalysisConfig,
) -> SentimentOutcome {
    let utterances = transcript::isolate_patient_dialogue(transcript);
    if utterances.is_empty() {
        warn!("no patient dialogue found");
        return SentimentOutcome::NoPatientDialogue;
    }

    let sentiment = registry.sentiment();
    let intent = registry.intent();
    match annotate::annotate(
        sentiment.as_deref(),
        intent.as_deref(),
        &utterances,
        config.annotate_concurrency,
    )
    .await
    {
        Ok(utterances) => SentimentOutcome::Annotated { utterances },
        Err(err) => {
            warn!(error = %err, "sentiment annotation failed");
            SentimentOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}
