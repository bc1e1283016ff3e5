// src/backup.rs

//! Portable JSON backups of the whole journal.
//!
//! Export writes every entry plus the export time:
//!
//! ```text
//! { "exportedAt": 1718000000000, "entries": [ { "id": "..", "ts": 0, "tag": "", "text": ".." } ] }
//! ```
//!
//! Import is a merge: each record with an `id` is upserted, entries already in the
//! store but absent from the file are left alone. Records are decoded up front and
//! applied in one transaction, so an import either lands completely or not at all.

use crate::db::EntryStore;
use crate::error::{PdError, Result};
use crate::models::Entry;
use crate::query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: i64,
    pub entries: Vec<Entry>,
}

/// `pd-tracker-backup-YYYY-MM-DD.json`, dated in UTC.
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("pd-tracker-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Builds a document holding every entry, most recent first.
pub fn export(store: &EntryStore, now: DateTime<Utc>) -> Result<ExportDocument> {
    let entries = query::search(store.get_all()?, "");
    Ok(ExportDocument {
        exported_at: now.timestamp_millis(),
        entries,
    })
}

pub fn export_json(store: &EntryStore, now: DateTime<Utc>) -> Result<String> {
    let doc = export(store, now)?;
    serde_json::to_string_pretty(&doc)
        .map_err(|e| PdError::MalformedDocument(format!("Failed to serialize backup: {}", e)))
}

/// Writes a backup into `dir` under the dated file name and returns its path.
pub fn write_export(store: &EntryStore, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    let json = export_json(store, now)?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let path = dir.join(backup_file_name(now));
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "backup written");
    Ok(path)
}

/// Merges an already-parsed document into the store. Returns the number of records upserted.
pub fn import_document(store: &mut EntryStore, doc: &Value) -> Result<usize> {
    let records = decode_records(doc)?;
    let count = store.upsert_all(&records)?;
    info!(count, "backup imported");
    Ok(count)
}

pub fn import_str(store: &mut EntryStore, input: &str) -> Result<usize> {
    import_bytes(store, input.as_bytes())
}

/// Raw file contents; invalid UTF-8 is reported by the JSON parser like any other bad input.
fn import_bytes(store: &mut EntryStore, input: &[u8]) -> Result<usize> {
    let doc: Value = serde_json::from_slice(input)
        .map_err(|e| PdError::MalformedDocument(format!("Not valid JSON: {}", e)))?;
    import_document(store, &doc)
}

pub fn import_file(store: &mut EntryStore, path: &Path) -> Result<usize> {
    let input = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = input.len(), "reading backup");
    import_bytes(store, &input)
}

fn decode_records(doc: &Value) -> Result<Vec<Entry>> {
    // `Value::get` yields None for non-object documents, which count as empty.
    let items = match doc.get("entries") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(PdError::MalformedDocument(format!(
                "`entries` must be an array, found {}",
                json_kind(other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = match item.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => {
                warn!(index, "skipping backup record without id");
                continue;
            }
            Some(other) => {
                return Err(PdError::MalformedDocument(format!(
                    "record {}: `id` has unexpected type {}",
                    index,
                    json_kind(other)
                )))
            }
        };
        let ts = match item.get("ts") {
            None | Some(Value::Null) => 0,
            Some(v) => v.as_i64().ok_or_else(|| wrong_type(&id, "ts", v))?,
        };
        let tag = string_field(item, "tag", &id)?;
        let text = string_field(item, "text", &id)?;
        records.push(Entry { id, ts, tag, text });
    }
    Ok(records)
}

fn string_field(item: &Value, field: &str, id: &str) -> Result<String> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v) => Err(wrong_type(id, field, v)),
    }
}

fn wrong_type(id: &str, field: &str, value: &Value) -> PdError {
    PdError::MalformedDocument(format!(
        "record {}: `{}` has unexpected type {}",
        id,
        field,
        json_kind(value)
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
