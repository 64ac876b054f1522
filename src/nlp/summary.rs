//! Clinical summary assembled from entity taggers and extractive QA.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use tracing::{debug, instrument, warn};

use crate::config::AnalysisConfig;

use super::{
    ner::{EntityCategory, EntityTagger, ExtractedEntity},
    qa::{QaAnswer, QuestionAnswerer, QuestionKey},
    registry::ModelRegistry,
};

static TITLED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Mr\.|Ms\.|Mrs\.)\s+[A-Z][A-Za-z]*").expect("valid regex"));

/// Summary record exported as `summary.json`.
///
/// QA-backed fields are omitted entirely when no answer cleared the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalSummary {
    #[serde(rename = "Patient_Name")]
    pub patient_name: Option<String>,
    #[serde(rename = "Symptoms")]
    pub symptoms: Vec<String>,
    #[serde(rename = "Treatment")]
    pub treatment: Vec<String>,
    #[serde(rename = "Diagnosis", skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(rename = "Current_Status", skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
    #[serde(rename = "Prognosis", skip_serializing_if = "Option::is_none")]
    pub prognosis: Option<String>,
    #[serde(rename = "Extracted_On", serialize_with = "utc_micros")]
    pub extracted_on: DateTime<Utc>,
}

impl ClinicalSummary {
    /// Merge the three extractor outputs into one record.
    pub fn assemble(
        patient_name: Option<String>,
        findings: MedicalFindings,
        mut answers: IndexMap<QuestionKey, QaAnswer>,
        extracted_on: DateTime<Utc>,
    ) -> Self {
        let mut take = |key: QuestionKey| answers.shift_remove(&key).map(|a| a.answer);
        Self {
            patient_name,
            symptoms: findings.symptoms,
            treatment: findings.treatment,
            diagnosis: take(QuestionKey::Diagnosis),
            current_status: take(QuestionKey::CurrentStatus),
            prognosis: take(QuestionKey::Prognosis),
            extracted_on,
        }
    }
}

fn utc_micros<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Symptom and treatment mentions in order of appearance, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MedicalFindings {
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
}

/// Run every extractor against the full transcript. Never fails.
#[instrument(skip_all)]
pub async fn summarize(
    registry: &ModelRegistry,
    transcript: &str,
    config: &AnalysisConfig,
) -> ClinicalSummary {
    let general = registry.general_ner();
    let medical = registry.medical_ner();
    let answerer = registry.question_answerer();

    let (patient_name, findings, answers) = tokio::join!(
        extract_patient_name(general.as_deref(), transcript),
        extract_medical_info(medical.as_deref(), transcript),
        extract_qa_info(answerer.as_deref(), transcript, config.qa_min_confidence),
    );
    ClinicalSummary::assemble(patient_name, findings, answers, Utc::now())
}

/// First person entity, else a titled name such as "Mrs. Jones".
pub async fn extract_patient_name(
    tagger: Option<&dyn EntityTagger>,
    text: &str,
) -> Option<String> {
    if let Some(tagger) = tagger {
        match tagger.tag(text).await {
            Ok(entities) => {
                let person = entities
                    .iter()
                    .filter_map(ExtractedEntity::from_general)
                    .find(|e| e.category == EntityCategory::Person);
                if let Some(person) = person {
                    return Some(person.text);
                }
            }
            Err(err) => warn!(error = %err, "general NER failed; using title pattern"),
        }
    }
    TITLED_NAME.find(text).map(|m| m.as_str().to_string())
}

/// Symptoms and treatment mentions from the biomedical tagger.
pub async fn extract_medical_info(
    tagger: Option<&dyn EntityTagger>,
    text: &str,
) -> MedicalFindings {
    let mut findings = MedicalFindings::default();
    let Some(tagger) = tagger else {
        return findings;
    };
    let entities = match tagger.tag(text).await {
        Ok(entities) => entities,
        Err(err) => {
            warn!(error = %err, "biomedical NER failed");
            return findings;
        }
    };
    for entity in entities.iter().filter_map(ExtractedEntity::from_biomedical) {
        match entity.category {
            EntityCategory::Symptom => findings.symptoms.push(entity.text),
            EntityCategory::Treatment => findings.treatment.push(entity.text),
            EntityCategory::Person => {}
        }
    }
    findings
}

/// Ask each fixed question; keep answers scoring strictly above `min_confidence`.
pub async fn extract_qa_info(
    answerer: Option<&dyn QuestionAnswerer>,
    context: &str,
    min_confidence: f64,
) -> IndexMap<QuestionKey, QaAnswer> {
    let mut answers = IndexMap::new();
    let Some(answerer) = answerer else {
        return answers;
    };
    for key in QuestionKey::ALL {
        match answerer.answer(key.question(), context).await {
            Ok(resp) if resp.score > min_confidence => {
                answers.insert(
                    key,
                    QaAnswer {
                        key,
                        answer: resp.answer,
                        confidence: resp.score,
                    },
                );
            }
            Ok(resp) => {
                debug!(key = key.as_str(), score = resp.score, "answer below threshold")
            }
            Err(err) => warn!(key = key.as_str(), error = %err, "question failed; skipping"),
        }
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_pattern_needs_capitalised_word() {
        assert_eq!(
            TITLED_NAME.find("Thanks, Ms. Jones.").map(|m| m.as_str()),
            Some("Ms. Jones")
        );
        assert!(TITLED_NAME.find("Mr. and Mrs. smith").is_none());
    }
}
