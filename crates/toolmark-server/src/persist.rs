// crates/toolmark-server/src/persist.rs
// JSON document persistence: load with shape validation and recovery, full-document writes

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// A document that can back a ledger file.
///
/// `RECORDS_FIELD` names the array that holds the ledger's records; loading
/// rejects files where it, or `server_name`, has the wrong JSON type.
pub trait LedgerDocument: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Short label used in logs and errors
    const KIND: &'static str;
    const RECORDS_FIELD: &'static str;

    fn empty(server_name: &str) -> Self;

    /// Serialize for writing. Documents with a size policy may shrink
    /// themselves in place before returning the bytes that will be written.
    fn serialize_for_write(&mut self, _max_bytes: Option<u64>) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Raw records currently held; documents without a size policy report 0
    fn record_count(&self) -> usize {
        0
    }

    /// Drop the `count` oldest records, mirroring a trim applied to a copy
    fn discard_oldest(&mut self, _count: usize) {}
}

/// How a loaded document came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Parsed from an existing, well-formed file
    Existing,
    /// No file on disk; a fresh default was created
    Missing,
    /// The file was unreadable or malformed and was replaced by a default
    Recovered,
}

impl LoadOutcome {
    /// Whether the caller should write the default back to disk
    pub fn needs_persist(&self) -> bool {
        !matches!(self, LoadOutcome::Existing)
    }
}

#[derive(Debug)]
pub struct Loaded<D> {
    pub document: D,
    pub outcome: LoadOutcome,
}

/// Whether a parsed value has the structure of a `D` document
pub fn has_valid_shape<D: LedgerDocument>(value: &Value) -> bool {
    value.get("server_name").is_some_and(Value::is_string)
        && value.get(D::RECORDS_FIELD).is_some_and(Value::is_array)
}

/// Load a document, degrading every failure to a fresh default.
pub async fn load<D: LedgerDocument>(path: &Path, server_name: &str) -> Loaded<D> {
    let fresh = |outcome| Loaded {
        document: D::empty(server_name),
        outcome,
    };

    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), kind = D::KIND, "No ledger file, starting fresh");
            return fresh(LoadOutcome::Missing);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, kind = D::KIND, "Failed to read ledger file, starting fresh");
            return fresh(LoadOutcome::Recovered);
        }
    };

    match parse_document::<D>(&contents) {
        Ok(document) => Loaded {
            document,
            outcome: LoadOutcome::Existing,
        },
        Err(reason) => {
            error!(path = %path.display(), reason = %reason, kind = D::KIND, "Discarding corrupted ledger file");
            fresh(LoadOutcome::Recovered)
        }
    }
}

fn parse_document<D: LedgerDocument>(contents: &str) -> std::result::Result<D, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| format!("malformed JSON: {}", e))?;
    if !has_valid_shape::<D>(&value) {
        return Err(format!(
            "expected string `server_name` and array `{}`",
            D::RECORDS_FIELD
        ));
    }
    serde_json::from_value(value).map_err(|e| format!("invalid document: {}", e))
}

/// Serialize and write a whole document
pub async fn save<D: LedgerDocument>(path: &Path, document: &D) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    write_contents(path, json.as_bytes()).await
}

/// Replace the file at `path` with `contents`.
///
/// Writes a sibling temp file and renames it over the target, so a crash
/// leaves either the old or the new document on disk.
pub async fn write_contents(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_directory_exists(path).await?;
    let tmp = temp_path(path);
    let written = async {
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if let Err(e) = written {
        // A partial or orphaned temp file must not outlive a failed write
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Create the parent directory of `path` if missing
pub async fn ensure_directory_exists(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Size of the file at `path`, 0 when absent or unreadable
pub async fn file_size_bytes(path: &Path) -> u64 {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .unwrap_or(0)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
