//! JSON artefact export.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

pub const SUMMARY_FILE: &str = "summary.json";
pub const SENTIMENT_FILE: &str = "sentiment.json";
pub const SOAP_FILE: &str = "soap_note.json";

/// Pretty-print `value` with two-space indentation, as downloaded by users.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serialising json artefact")
}

/// Write `value` to `dir/file_name`, creating `dir` if needed.
pub fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    let file = File::create(&path).with_context(|| format!("create {path:?}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), "wrote json artefact");
    Ok(path)
}
