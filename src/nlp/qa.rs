//! Extractive question answering seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InferenceError;

/// Best span returned by an extractive QA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResponse {
    pub answer: String,
    pub score: f64,
}

#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> Result<QaResponse, InferenceError>;
}

/// Summary fields filled in by asking the transcript a fixed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum QuestionKey {
    #[serde(rename = "Diagnosis")]
    Diagnosis,
    #[serde(rename = "Current_Status")]
    CurrentStatus,
    #[serde(rename = "Prognosis")]
    Prognosis,
}

impl QuestionKey {
    pub const ALL: [Self; 3] = [Self::Diagnosis, Self::CurrentStatus, Self::Prognosis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnosis => "Diagnosis",
            Self::CurrentStatus => "Current_Status",
            Self::Prognosis => "Prognosis",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Self::Diagnosis => "What was the patient diagnosed with?",
            Self::CurrentStatus => "What pain or symptoms is the patient still experiencing?",
            Self::Prognosis => "What is the doctor's prognosis?",
        }
    }
}

/// An answer that cleared the confidence threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaAnswer {
    pub key: QuestionKey,
    pub answer: String,
    pub confidence: f64,
}
