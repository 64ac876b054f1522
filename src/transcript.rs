//! Transcript loading and patient dialogue isolation.

use std::{fmt, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

const PATIENT_PREFIX: &str = "patient:";

/// A single patient turn with its speaker prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Utterance(String);

impl Utterance {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Utterance {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read a `.txt` transcript as UTF-8.
pub fn read_transcript(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

/// Collect the lines spoken by the patient, in transcript order.
///
/// Lines break on `\n`, `\r` and the other Unicode line boundaries
/// (`\x0b`, `\x0c`, `\x1c`..`\x1e`, NEL, U+2028, U+2029).
/// A line counts when its trimmed form starts with `Patient:` in any case.
/// Turns that are empty once the prefix is removed are skipped.
pub fn isolate_patient_dialogue(transcript: &str) -> Vec<Utterance> {
    transcript
        .split(is_line_break)
        .filter_map(|line| strip_patient_prefix(line.trim()))
        .map(|rest| rest.trim())
        .filter(|utterance| !utterance.is_empty())
        .map(|utterance| Utterance(utterance.to_string()))
        .collect()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn strip_patient_prefix(line: &str) -> Option<&str> {
    let head = line.get(..PATIENT_PREFIX.len())?;
    head.eq_ignore_ascii_case(PATIENT_PREFIX)
        .then(|| &line[PATIENT_PREFIX.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_requires_char_boundary() {
        // multi-byte text must not panic when sliced at the prefix length
        assert_eq!(strip_patient_prefix("Pätient: hi"), None);
        assert_eq!(strip_patient_prefix("Pat"), None);
    }

    #[test]
    fn crlf_lines_are_split() {
        let lines = isolate_patient_dialogue("Patient: one\r\nDoctor: two\r\npatient: three\r\n");
        let texts: Vec<&str> = lines.iter().map(Utterance::as_str).collect();
        assert_eq!(texts, vec!["one", "three"]);
    }
}
