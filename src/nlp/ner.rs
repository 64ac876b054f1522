//! Entity tagger seam and the remapping of model label vocabularies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Entity group emitted by a token-classification model with simple aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub entity_group: String,
    pub word: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl TaggedEntity {
    pub fn new(entity_group: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            entity_group: entity_group.into(),
            word: word.into(),
            score: None,
        }
    }
}

/// Trait for NER implementations.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, InferenceError>;
}

/// Closed set of categories the summary cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityCategory {
    Symptom,
    Treatment,
    Person,
}

impl EntityCategory {
    /// Labels from a CoNLL-style general tagger.
    pub fn from_general_label(label: &str) -> Option<Self> {
        match label {
            "PER" => Some(Self::Person),
            _ => None,
        }
    }

    /// Labels from the biomedical tagger vocabulary.
    pub fn from_biomedical_label(label: &str) -> Option<Self> {
        match label {
            "Sign_symptom" => Some(Self::Symptom),
            "Medication" | "Therapeutic_procedure" | "Diagnostic_procedure" => {
                Some(Self::Treatment)
            }
            _ => None,
        }
    }
}

/// An entity after label remapping.
///
/// Biomedical mentions have sub-word markers removed; person names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEntity {
    pub category: EntityCategory,
    pub text: String,
}

impl ExtractedEntity {
    pub fn from_general(entity: &TaggedEntity) -> Option<Self> {
        EntityCategory::from_general_label(&entity.entity_group).map(|category| Self {
            category,
            text: entity.word.clone(),
        })
    }

    pub fn from_biomedical(entity: &TaggedEntity) -> Option<Self> {
        EntityCategory::from_biomedical_label(&entity.entity_group).map(|category| Self {
            category,
            text: clean_word(&entity.word),
        })
    }
}

/// Drop WordPiece continuation markers (`##`) left inside aggregated words.
pub fn clean_word(word: &str) -> String {
    word.replace("##", "")
}
