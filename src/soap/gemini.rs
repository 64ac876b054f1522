//! Generative model seam and the Google Generative Language client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::SoapSettings;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),
    #[error("credential rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl LlmError {
    /// The request never reached the model because of the credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidCredential(_) | Self::Unauthorized { .. })
    }

    /// Worth another attempt: network trouble, throttling or a server fault.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseShapeError {
    #[error("response has no text and no candidates")]
    NoCandidates,
    #[error("first candidate carries no text part")]
    MissingText,
    #[error("model returned empty text")]
    Empty,
}

/// Generation result in either of the shapes the API produces.
///
/// Callers ask for [`GenerationResponse::best_text`] instead of probing fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerationResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            candidates: Vec::new(),
        }
    }

    /// Direct text when present and non-empty, else the first part of the first candidate.
    pub fn best_text(&self) -> Result<&str, ResponseShapeError> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(text);
        }
        let candidate = self.candidates.first().ok_or(ResponseShapeError::NoCandidates)?;
        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or(ResponseShapeError::MissingText)?;
        if text.trim().is_empty() {
            return Err(ResponseShapeError::Empty);
        }
        Ok(text)
    }
}

/// A configured generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<GenerationResponse, LlmError>;
}

/// Turns a credential into a usable model; rejecting it is an auth failure.
pub trait ModelConnector: Send + Sync {
    fn configure(&self, credential: &str) -> Result<Box<dyn GenerativeModel>, LlmError>;
}

/// Connector for the Google Generative Language API.
#[derive(Debug, Clone)]
pub struct GeminiConnector {
    client: Client,
    endpoint: String,
}

impl GeminiConnector {
    pub fn new(settings: &SoapSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent(concat!("physician-notetaker/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .gzip(true)
            .build()?;
        let endpoint = format!(
            "{}/v1beta/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model.trim_start_matches('/')
        );
        Ok(Self { client, endpoint })
    }
}

impl ModelConnector for GeminiConnector {
    fn configure(&self, credential: &str) -> Result<Box<dyn GenerativeModel>, LlmError> {
        let key = credential.trim();
        if key.is_empty() {
            return Err(LlmError::InvalidCredential("API key is empty".into()));
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LlmError::InvalidCredential(
                "API key contains whitespace or control characters".into(),
            ));
        }
        Ok(Box::new(GeminiModel {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            api_key: key.to_string(),
        }))
    }
}

struct GeminiModel {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate_content(&self, prompt: &str) -> Result<GenerationResponse, LlmError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        debug!(endpoint = %self.endpoint, "generateContent request");
        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_status(status, body))
    }
}

/// Map a non-success generateContent response to an error.
///
/// Invalid keys come back as 400 with `API_KEY_INVALID` in the body.
fn classify_status(status: StatusCode, body: String) -> LlmError {
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
    {
        return LlmError::Unauthorized {
            status: status.as_u16(),
            body,
        };
    }
    LlmError::Status {
        status: status.as_u16(),
        body,
    }
}
