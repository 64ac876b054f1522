//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: String,
}

#[derive(Clone, Deserialize)]
pub struct SoapRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    pub transcript: String,
}

impl std::fmt::Debug for SoapRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoapRequest")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("transcript_chars", &self.transcript.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub version: &'static str,
    pub models_loaded: usize,
}
