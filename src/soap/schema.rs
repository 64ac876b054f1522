//! Fixed SOAP note schema, prompt construction and schema repair.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Value written into every schema leaf the model did not fill in.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Sections in output order, each with its leaf fields.
pub const SOAP_SCHEMA: &[(&str, &[&str])] = &[
    ("Subjective", &["Chief_Complaint", "History_of_Present_Illness"]),
    ("Objective", &["Physical_Exam", "Observations"]),
    ("Assessment", &["Diagnosis", "Severity"]),
    ("Plan", &["Treatment", "Follow_Up"]),
];

#[derive(Debug, Error, PartialEq)]
pub enum RepairError {
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("section {section} is {found}, expected an object")]
    SectionNotAnObject {
        section: &'static str,
        found: &'static str,
    },
}

/// A parsed note guaranteed to contain every schema section and leaf.
///
/// Keys outside the schema are kept as the model returned them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SoapNote(Map<String, Value>);

impl SoapNote {
    /// Leaf text, if it is a string.
    pub fn field(&self, section: &str, leaf: &str) -> Option<&str> {
        self.0.get(section)?.get(leaf)?.as_str()
    }
}

/// Schema with empty leaves, as shown to the model.
pub fn schema_json() -> Value {
    let sections = SOAP_SCHEMA
        .iter()
        .map(|(section, fields)| (section.to_string(), Value::Object(leaves(fields, ""))))
        .collect();
    Value::Object(sections)
}

fn leaves(fields: &[&str], value: &str) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.to_string(), Value::String(value.to_string())))
        .collect()
}

/// Prompt embedding the schema and the transcript.
pub fn build_prompt(transcript: &str) -> String {
    format!(
        "Convert this transcript into a concise JSON object following this schema:\n{}\n\nTranscript:\n{}",
        schema_json(),
        transcript
    )
}

/// Remove a leading ```` ```json ```` or ```` ``` ```` fence and a trailing ```` ``` ````.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Fill in every schema section and leaf missing from `value`.
pub fn repair(value: Value) -> Result<SoapNote, RepairError> {
    let mut note = match value {
        Value::Object(map) => map,
        other => return Err(RepairError::NotAnObject(kind(&other))),
    };
    for &(section, fields) in SOAP_SCHEMA {
        match note.get_mut(section) {
            None => {
                note.insert(
                    section.to_string(),
                    Value::Object(leaves(fields, NOT_SPECIFIED)),
                );
            }
            Some(Value::Object(present)) => {
                for field in fields {
                    present
                        .entry(field.to_string())
                        .or_insert_with(|| Value::String(NOT_SPECIFIED.to_string()));
                }
            }
            Some(other) => {
                return Err(RepairError::SectionNotAnObject {
                    section,
                    found: kind(other),
                })
            }
        }
    }
    Ok(SoapNote(note))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn prompt_embeds_schema_and_transcript() {
        let prompt = build_prompt("Doctor: Hello");
        assert!(prompt.contains("\"Chief_Complaint\":\"\""));
        assert!(prompt.ends_with("Transcript:\nDoctor: Hello"));
    }

    #[test]
    fn non_object_section_is_rejected() {
        let err = repair(serde_json::json!({ "Plan": "rest" })).unwrap_err();
        assert_eq!(
            err,
            RepairError::SectionNotAnObject {
                section: "Plan",
                found: "a string"
            }
        );
    }
}
