//! Hugging Face Inference API backends for the NLP collaborators.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{InferenceSettings, Settings};

use super::{
    classify::{SentimentClassifier, SentimentScore, ZeroShotClassifier, ZeroShotResult},
    ner::{EntityTagger, TaggedEntity},
    qa::{QaResponse, QuestionAnswerer},
    registry::{ModelProvider, ModelRegistry},
    InferenceError,
};

/// Provider backed by a hosted inference endpoint.
///
/// Without an API token every collaborator is reported unavailable.
#[derive(Clone)]
pub struct HostedInference {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl fmt::Debug for HostedInference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedInference")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HostedInference {
    pub fn new(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .user_agent(concat!("physician-notetaker/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone(),
        })
    }

    fn model(&self, model: &str) -> Result<Arc<HostedModel>, InferenceError> {
        let token = self
            .api_token
            .clone()
            .ok_or_else(|| InferenceError::Unavailable("HF_API_TOKEN is not set".into()))?;
        Ok(Arc::new(HostedModel {
            client: self.client.clone(),
            url: format!("{}/models/{}", self.base_url, model),
            token,
        }))
    }
}

impl ModelProvider for HostedInference {
    fn entity_tagger(&self, model: &str) -> Result<Arc<dyn EntityTagger>, InferenceError> {
        Ok(self.model(model)? as Arc<dyn EntityTagger>)
    }

    fn question_answerer(
        &self,
        model: &str,
    ) -> Result<Arc<dyn QuestionAnswerer>, InferenceError> {
        Ok(self.model(model)? as Arc<dyn QuestionAnswerer>)
    }

    fn sentiment_classifier(
        &self,
        model: &str,
    ) -> Result<Arc<dyn SentimentClassifier>, InferenceError> {
        Ok(self.model(model)? as Arc<dyn SentimentClassifier>)
    }

    fn zero_shot_classifier(
        &self,
        model: &str,
    ) -> Result<Arc<dyn ZeroShotClassifier>, InferenceError> {
        Ok(self.model(model)? as Arc<dyn ZeroShotClassifier>)
    }
}

/// Build the registry used by the CLI and the HTTP server.
pub fn registry_from_settings(settings: &Settings) -> Result<ModelRegistry, InferenceError> {
    let provider = HostedInference::new(&settings.inference)?;
    Ok(ModelRegistry::new(
        Arc::new(provider),
        settings.models.clone(),
    ))
}

struct HostedModel {
    client: Client,
    url: String,
    token: String,
}

impl HostedModel {
    async fn post<T: DeserializeOwned>(&self, body: &Value) -> Result<T, InferenceError> {
        debug!(url = %self.url, "inference request");
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let payload: Value = resp.json().await?;
        serde_json::from_value(payload).map_err(|e| InferenceError::Payload(e.to_string()))
    }
}

#[async_trait]
impl EntityTagger for HostedModel {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, InferenceError> {
        let body = json!({
            "inputs": text,
            "parameters": { "aggregation_strategy": "simple" },
        });
        self.post(&body).await
    }
}

#[async_trait]
impl QuestionAnswerer for HostedModel {
    async fn answer(&self, question: &str, context: &str) -> Result<QaResponse, InferenceError> {
        let body = json!({ "inputs": { "question": question, "context": context } });
        let payload: QaPayload = self.post(&body).await?;
        payload.best()
    }
}

#[async_trait]
impl SentimentClassifier for HostedModel {
    async fn classify(&self, text: &str) -> Result<SentimentScore, InferenceError> {
        let body = json!({ "inputs": text });
        let payload: ClassificationPayload = self.post(&body).await?;
        payload.top()
    }
}

#[async_trait]
impl ZeroShotClassifier for HostedModel {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotResult, InferenceError> {
        let body = json!({
            "inputs": text,
            "parameters": { "candidate_labels": candidate_labels },
        });
        let payload: ZeroShotPayload = self.post(&body).await?;
        Ok(payload.into_result())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QaPayload {
    Single(QaResponse),
    Many(Vec<QaResponse>),
}

impl QaPayload {
    fn best(self) -> Result<QaResponse, InferenceError> {
        match self {
            Self::Single(answer) => Ok(answer),
            Self::Many(answers) => answers
                .into_iter()
                .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
                .ok_or_else(|| InferenceError::Payload("empty answer list".into())),
        }
    }
}

/// Text classification comes back either flat or nested one level per input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Nested(Vec<Vec<SentimentScore>>),
    Flat(Vec<SentimentScore>),
}

impl ClassificationPayload {
    fn top(self) -> Result<SentimentScore, InferenceError> {
        let scores = match self {
            Self::Nested(mut outer) if !outer.is_empty() => outer.swap_remove(0),
            Self::Nested(_) => Vec::new(),
            Self::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| InferenceError::Payload("no classification labels".into()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotPayload {
    Parallel(ZeroShotResult),
    Pairs(Vec<SentimentScore>),
}

impl ZeroShotPayload {
    fn into_result(self) -> ZeroShotResult {
        match self {
            Self::Parallel(result) => result,
            Self::Pairs(pairs) => {
                let (labels, scores) = pairs.into_iter().map(|p| (p.label, p.score)).unzip();
                ZeroShotResult { labels, scores }
            }
        }
    }
}
