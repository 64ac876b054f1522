//! Construct-once cache of NLP collaborators keyed by task and model name.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{debug, info, warn};

use crate::config::ModelCatalog;

use super::{
    classify::{SentimentClassifier, ZeroShotClassifier},
    ner::EntityTagger,
    qa::QuestionAnswerer,
    InferenceError,
};

/// Pipeline task a model is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    TokenClassification,
    QuestionAnswering,
    TextClassification,
    ZeroShotClassification,
}

/// Cache key for one constructed collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub task: Task,
    pub model: String,
}

/// Builds collaborators. Construction may be expensive; invocation is not.
pub trait ModelProvider: Send + Sync {
    fn entity_tagger(&self, model: &str) -> Result<Arc<dyn EntityTagger>, InferenceError>;
    fn question_answerer(&self, model: &str)
        -> Result<Arc<dyn QuestionAnswerer>, InferenceError>;
    fn sentiment_classifier(
        &self,
        model: &str,
    ) -> Result<Arc<dyn SentimentClassifier>, InferenceError>;
    fn zero_shot_classifier(
        &self,
        model: &str,
    ) -> Result<Arc<dyn ZeroShotClassifier>, InferenceError>;
}

#[derive(Clone)]
enum Handle {
    Tagger(Arc<dyn EntityTagger>),
    Answerer(Arc<dyn QuestionAnswerer>),
    Sentiment(Arc<dyn SentimentClassifier>),
    ZeroShot(Arc<dyn ZeroShotClassifier>),
}

/// Shared registry handed by reference to every analysis call.
///
/// Each (task, model) pair is built at most once. A failed build is cached as
/// absent, so later calls see the same unavailable collaborator.
pub struct ModelRegistry {
    provider: Arc<dyn ModelProvider>,
    catalog: ModelCatalog,
    slots: Mutex<HashMap<ModelKey, Option<Handle>>>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl ModelRegistry {
    pub fn new(provider: Arc<dyn ModelProvider>, catalog: ModelCatalog) -> Self {
        Self {
            provider,
            catalog,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Biomedical entity tagger.
    pub fn medical_ner(&self) -> Option<Arc<dyn EntityTagger>> {
        self.tagger(&self.catalog.medical_ner)
    }

    /// General-purpose entity tagger used for person names.
    pub fn general_ner(&self) -> Option<Arc<dyn EntityTagger>> {
        self.tagger(&self.catalog.general_ner)
    }

    pub fn question_answerer(&self) -> Option<Arc<dyn QuestionAnswerer>> {
        let model = &self.catalog.question_answering;
        match self.resolve(Task::QuestionAnswering, model, |p, m| {
            p.question_answerer(m).map(Handle::Answerer)
        })? {
            Handle::Answerer(answerer) => Some(answerer),
            _ => None,
        }
    }

    pub fn sentiment(&self) -> Option<Arc<dyn SentimentClassifier>> {
        let model = &self.catalog.sentiment;
        match self.resolve(Task::TextClassification, model, |p, m| {
            p.sentiment_classifier(m).map(Handle::Sentiment)
        })? {
            Handle::Sentiment(classifier) => Some(classifier),
            _ => None,
        }
    }

    /// Zero-shot classifier used for patient intent.
    pub fn intent(&self) -> Option<Arc<dyn ZeroShotClassifier>> {
        let model = &self.catalog.intent;
        match self.resolve(Task::ZeroShotClassification, model, |p, m| {
            p.zero_shot_classifier(m).map(Handle::ZeroShot)
        })? {
            Handle::ZeroShot(classifier) => Some(classifier),
            _ => None,
        }
    }

    /// Number of (task, model) slots resolved so far, including absent ones.
    pub fn loaded(&self) -> usize {
        self.lock().len()
    }

    fn tagger(&self, model: &str) -> Option<Arc<dyn EntityTagger>> {
        match self.resolve(Task::TokenClassification, model, |p, m| {
            p.entity_tagger(m).map(Handle::Tagger)
        })? {
            Handle::Tagger(tagger) => Some(tagger),
            _ => None,
        }
    }

    fn resolve<F>(&self, task: Task, model: &str, build: F) -> Option<Handle>
    where
        F: FnOnce(&dyn ModelProvider, &str) -> Result<Handle, InferenceError>,
    {
        let key = ModelKey {
            task,
            model: model.to_string(),
        };
        let mut slots = self.lock();
        if let Some(cached) = slots.get(&key) {
            debug!(?task, model, "model cache hit");
            return cached.clone();
        }
        let handle = match build(self.provider.as_ref(), model) {
            Ok(handle) => {
                info!(?task, model, "model loaded");
                Some(handle)
            }
            Err(err) => {
                warn!(?task, model, error = %err, "model unavailable");
                None
            }
        };
        slots.insert(key, handle.clone());
        handle
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ModelKey, Option<Handle>>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
