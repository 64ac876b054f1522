//! Runtime configuration utilities for physician-notetaker.

use std::{
    env,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use anyhow::Context;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root folder for exported JSON artefacts.
    pub outputs_dir: PathBuf,
    /// Hosted NLP inference endpoint.
    pub inference: InferenceSettings,
    /// Model identifiers per pipeline task.
    pub models: ModelCatalog,
    /// Generative model used for SOAP notes.
    pub soap: SoapSettings,
    /// Tunables for the analysis pipeline.
    pub analysis: AnalysisConfig,
}

/// Connection details for the hosted NLP models.
#[derive(Clone)]
pub struct InferenceSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for InferenceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Model names for each NLP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub medical_ner: String,
    pub general_ner: String,
    pub question_answering: String,
    pub sentiment: String,
    pub intent: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            medical_ner: "d4data/biomedical-ner-all".to_string(),
            general_ner: "dbmdz/bert-large-cased-finetuned-conll03-english".to_string(),
            question_answering: "deepset/roberta-large-squad2".to_string(),
            sentiment: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            intent: "facebook/bart-large-mnli".to_string(),
        }
    }
}

/// Generative model settings. The API credential itself is supplied per request.
#[derive(Debug, Clone)]
pub struct SoapSettings {
    pub base_url: String,
    pub model: String,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl Default for SoapSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "models/gemini-2.5-pro".to_string(),
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Analysis knobs that were placeholders rather than tuned values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// QA answers at or below this confidence are dropped.
    pub qa_min_confidence: f64,
    /// Utterances classified in flight at once; output order is unaffected.
    pub annotate_concurrency: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            qa_min_confidence: 0.1,
            annotate_concurrency: 1,
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let timeout = Duration::from_secs(parsed_env("HTTP_TIMEOUT_SECS", 120));

        let inference = InferenceSettings {
            base_url: env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            api_token: env::var("HF_API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            timeout,
        };

        let defaults = ModelCatalog::default();
        let models = ModelCatalog {
            medical_ner: env::var("MEDICAL_NER_MODEL").unwrap_or(defaults.medical_ner),
            general_ner: env::var("GENERAL_NER_MODEL").unwrap_or(defaults.general_ner),
            question_answering: env::var("QA_MODEL").unwrap_or(defaults.question_answering),
            sentiment: env::var("SENTIMENT_MODEL").unwrap_or(defaults.sentiment),
            intent: env::var("INTENT_MODEL").unwrap_or(defaults.intent),
        };

        let soap_defaults = SoapSettings::default();
        let soap = SoapSettings {
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(soap_defaults.base_url),
            model: env::var("SOAP_MODEL").unwrap_or(soap_defaults.model),
            max_retries: parsed_env("SOAP_MAX_RETRIES", soap_defaults.max_retries),
            initial_backoff: soap_defaults.initial_backoff,
            timeout,
        };

        let analysis_defaults = AnalysisConfig::default();
        let analysis = AnalysisConfig {
            qa_min_confidence: parsed_env("QA_MIN_CONFIDENCE", analysis_defaults.qa_min_confidence),
            annotate_concurrency: parsed_env(
                "ANNOTATE_CONCURRENCY",
                analysis_defaults.annotate_concurrency,
            )
            .max(1),
        };

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            outputs_dir,
            inference,
            models,
            soap,
            analysis,
        })
    }
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
