//! In-process fakes for the NLP and generative collaborators.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use physician_notetaker::{
    config::ModelCatalog,
    nlp::{
        classify::{SentimentClassifier, SentimentScore, ZeroShotClassifier, ZeroShotResult},
        ner::{EntityTagger, TaggedEntity},
        qa::{QaResponse, QuestionAnswerer},
        registry::{ModelProvider, ModelRegistry},
        InferenceError,
    },
    soap::gemini::{GenerationResponse, GenerativeModel, LlmError, ModelConnector},
};

pub struct FakeTagger(pub Vec<TaggedEntity>);

#[async_trait]
impl EntityTagger for FakeTagger {
    async fn tag(&self, _text: &str) -> Result<Vec<TaggedEntity>, InferenceError> {
        Ok(self.0.clone())
    }
}

pub struct FailingTagger;

#[async_trait]
impl EntityTagger for FailingTagger {
    async fn tag(&self, _text: &str) -> Result<Vec<TaggedEntity>, InferenceError> {
        Err(InferenceError::Status {
            status: 503,
            body: "loading".into(),
        })
    }
}

/// Answers keyed by question text; unknown questions fail.
#[derive(Default)]
pub struct FakeAnswerer(pub HashMap<&'static str, QaResponse>);

impl FakeAnswerer {
    pub fn with(mut self, question: &'static str, answer: &str, score: f64) -> Self {
        self.0.insert(
            question,
            QaResponse {
                answer: answer.to_string(),
                score,
            },
        );
        self
    }
}

#[async_trait]
impl QuestionAnswerer for FakeAnswerer {
    async fn answer(&self, question: &str, _context: &str) -> Result<QaResponse, InferenceError> {
        self.0
            .get(question)
            .cloned()
            .ok_or_else(|| InferenceError::Payload(format!("no answer for {question}")))
    }
}

/// Labels anything containing "worried" as NEGATIVE.
pub struct KeywordSentiment;

#[async_trait]
impl SentimentClassifier for KeywordSentiment {
    async fn classify(&self, text: &str) -> Result<SentimentScore, InferenceError> {
        if text.contains("worried") {
            Ok(SentimentScore {
                label: "NEGATIVE".into(),
                score: 0.9876,
            })
        } else {
            Ok(SentimentScore {
                label: "POSITIVE".into(),
                score: 0.7012,
            })
        }
    }
}

/// Fails on any utterance mentioning "neck".
pub struct FlakySentiment;

#[async_trait]
impl SentimentClassifier for FlakySentiment {
    async fn classify(&self, text: &str) -> Result<SentimentScore, InferenceError> {
        if text.contains("neck") {
            return Err(InferenceError::Status {
                status: 503,
                body: "model is loading".into(),
            });
        }
        KeywordSentiment.classify(text).await
    }
}

/// Ranks only labels outside the candidate set.
pub struct OffListIntent;

#[async_trait]
impl ZeroShotClassifier for OffListIntent {
    async fn classify(
        &self,
        _text: &str,
        _candidate_labels: &[&str],
    ) -> Result<ZeroShotResult, InferenceError> {
        Ok(ZeroShotResult {
            labels: vec!["Small talk".into(), "Billing question".into()],
            scores: vec![0.7, 0.3],
        })
    }
}

/// Ranks candidates by a fixed rule and optionally puts an off-list label first.
pub struct RuleIntent {
    pub off_list_first: bool,
}

#[async_trait]
impl ZeroShotClassifier for RuleIntent {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotResult, InferenceError> {
        let preferred = if text.contains("thank") {
            "Expressing gratitude"
        } else if text.contains("worried") {
            "Expressing concern"
        } else {
            "Reporting symptoms"
        };
        let mut labels = Vec::new();
        let mut scores = Vec::new();
        if self.off_list_first {
            labels.push("Small talk".to_string());
            scores.push(0.95);
        }
        labels.push(preferred.to_string());
        scores.push(0.8123);
        for label in candidate_labels.iter().filter(|l| **l != preferred) {
            labels.push(label.to_string());
            scores.push(0.01);
        }
        Ok(ZeroShotResult { labels, scores })
    }
}

/// Provider handing out configured fakes and counting constructions.
#[derive(Default)]
pub struct FakeProvider {
    pub general: Option<Arc<dyn EntityTagger>>,
    pub medical: Option<Arc<dyn EntityTagger>>,
    pub answerer: Option<Arc<dyn QuestionAnswerer>>,
    pub sentiment: Option<Arc<dyn SentimentClassifier>>,
    pub intent: Option<Arc<dyn ZeroShotClassifier>>,
    pub builds: AtomicUsize,
}

fn missing() -> InferenceError {
    InferenceError::Unavailable("not configured in test".into())
}

impl ModelProvider for FakeProvider {
    fn entity_tagger(&self, model: &str) -> Result<Arc<dyn EntityTagger>, InferenceError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let catalog = ModelCatalog::default();
        if model == catalog.general_ner {
            self.general.clone().ok_or_else(missing)
        } else {
            self.medical.clone().ok_or_else(missing)
        }
    }

    fn question_answerer(
        &self,
        _model: &str,
    ) -> Result<Arc<dyn QuestionAnswerer>, InferenceError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.answerer.clone().ok_or_else(missing)
    }

    fn sentiment_classifier(
        &self,
        _model: &str,
    ) -> Result<Arc<dyn SentimentClassifier>, InferenceError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.sentiment.clone().ok_or_else(missing)
    }

    fn zero_shot_classifier(
        &self,
        _model: &str,
    ) -> Result<Arc<dyn ZeroShotClassifier>, InferenceError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.intent.clone().ok_or_else(missing)
    }
}

pub fn registry(provider: FakeProvider) -> (ModelRegistry, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let registry = ModelRegistry::new(provider.clone(), ModelCatalog::default());
    (registry, provider)
}

/// Generative fake replaying scripted results and recording prompts.
pub struct ScriptedModel {
    replies: Mutex<Vec<Result<GenerationResponse, LlmError>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_content(&self, prompt: &str) -> Result<GenerationResponse, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(LlmError::Status {
                status: 500,
                body: "script exhausted".into(),
            });
        }
        replies.remove(0)
    }
}

/// Connector that accepts only the credential "good-key".
pub struct ScriptedConnector {
    replies: Mutex<Option<Vec<Result<GenerationResponse, LlmError>>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn new(replies: Vec<Result<GenerationResponse, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(Some(replies)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(GenerationResponse::from_text(text))])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ModelConnector for ScriptedConnector {
    fn configure(&self, credential: &str) -> Result<Box<dyn GenerativeModel>, LlmError> {
        if credential != "good-key" {
            return Err(LlmError::InvalidCredential(format!(
                "API key not valid: {credential}"
            )));
        }
        let replies = self.replies.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(ScriptedModel {
            replies: Mutex::new(replies),
            prompts: self.prompts.clone(),
        }))
    }
}
