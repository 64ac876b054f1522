//! SOAP note generation: prompt, model call, JSON parse and schema repair.

pub mod gemini;
pub mod schema;

use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{info, instrument, warn};

use crate::config::SoapSettings;

use self::{
    gemini::{GenerationResponse, GenerativeModel, LlmError, ModelConnector},
    schema::SoapNote,
};

/// Why a note could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The credential was refused; the model was never reached.
    AuthenticationFailed,
    /// The model was called but its reply was missing or unusable.
    ModelParsingFailed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "Authentication failed",
            Self::ModelParsingFailed => "Model parsing failed",
        }
    }
}

impl Serialize for FailureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Structured failure. Deliberately not shaped like a note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoapFailure {
    #[serde(rename = "Error")]
    pub error: FailureKind,
    #[serde(rename = "Details")]
    pub details: String,
}

/// Either a repaired note or a failure object; serialises as whichever it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SoapOutcome {
    Note(SoapNote),
    Failed(SoapFailure),
}

impl SoapOutcome {
    fn failed(error: FailureKind, details: impl ToString) -> Self {
        Self::Failed(SoapFailure {
            error,
            details: details.to_string(),
        })
    }

    pub fn note(&self) -> Option<&SoapNote> {
        match self {
            Self::Note(note) => Some(note),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SoapFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Note(_) => None,
        }
    }
}

/// Retry policy for transient model failures. Zero retries by default.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapOptions {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for SoapOptions {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&SoapSettings> for SoapOptions {
    fn from(settings: &SoapSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: settings.initial_backoff,
        }
    }
}

/// Generate a SOAP note for `transcript`. Never returns an error; failures are
/// folded into [`SoapOutcome::Failed`].
#[instrument(skip_all, fields(chars = transcript.len()))]
pub async fn generate_soap_note(
    connector: &dyn ModelConnector,
    credential: &str,
    transcript: &str,
    options: &SoapOptions,
) -> SoapOutcome {
    let model = match connector.configure(credential) {
        Ok(model) => model,
        Err(err) => {
            warn!(error = %err, "model configuration failed");
            return SoapOutcome::failed(FailureKind::AuthenticationFailed, err);
        }
    };

    let prompt = schema::build_prompt(transcript);
    let response = match generate_with_retry(model.as_ref(), &prompt, options).await {
        Ok(response) => response,
        Err(err) if err.is_auth() => {
            warn!(error = %err, "model rejected credential");
            return SoapOutcome::failed(FailureKind::AuthenticationFailed, err);
        }
        Err(err) => {
            warn!(error = %err, "model call failed");
            return SoapOutcome::failed(FailureKind::ModelParsingFailed, err);
        }
    };

    match parse_note(&response) {
        Ok(note) => {
            info!("soap note generated");
            SoapOutcome::Note(note)
        }
        Err(details) => {
            warn!(%details, "model response unusable");
            SoapOutcome::failed(FailureKind::ModelParsingFailed, details)
        }
    }
}

/// Extract, unfence, parse and repair the model's text.
pub fn parse_note(response: &GenerationResponse) -> Result<SoapNote, String> {
    let text = response.best_text().map_err(|e| e.to_string())?;
    let value = serde_json::from_str(schema::strip_code_fences(text)).map_err(|e| e.to_string())?;
    schema::repair(value).map_err(|e| e.to_string())
}

async fn generate_with_retry(
    model: &dyn GenerativeModel,
    prompt: &str,
    options: &SoapOptions,
) -> Result<GenerationResponse, LlmError> {
    let mut backoff = options.initial_backoff;
    let mut attempt = 0;
    loop {
        match model.generate_content(prompt).await {
            Err(err) if err.is_transient() && attempt < options.max_retries => {
                attempt += 1;
                warn!(attempt, error = %err, ?backoff, "transient model failure; retrying");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
            result => return result,
        }
    }
}
