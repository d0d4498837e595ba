//! # Commish Store
//! File-based document store: one JSON object per logical file.
//!
//! Human-readable, git-friendly, rewritten wholesale on every mutation. No
//! append log, no partial writes. Each document is owned by exactly one
//! tracker for the process's lifetime; documents mutated through a separate
//! command path (team claims) are re-read at the start of any trigger that
//! depends on them.

use std::path::{Path, PathBuf};

use commish_core::error::{CommishError, Result};
use serde_json::{Map, Value};

/// A single JSON document on disk.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Open a document inside `data_dir`, creating the backing file if it
    /// does not exist yet.
    ///
    /// The data directory itself must already exist: the bot cannot run
    /// without durable state, so a missing directory is fatal at startup
    /// rather than silently created somewhere surprising.
    pub fn open(data_dir: &Path, file_name: &str) -> Result<Self> {
        if !data_dir.is_dir() {
            return Err(CommishError::MissingConfiguration(format!(
                "data directory {} does not exist",
                data_dir.display()
            )));
        }
        let path = data_dir.join(file_name);
        if !path.exists() {
            std::fs::write(&path, b"")?;
            tracing::info!("File {} created", path.display());
        }
        Ok(Self { path })
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full document. An absent, empty, or unparsable file reads as
    /// an empty document; corruption is logged loudly, never fatal.
    pub fn read(&self) -> Map<String, Value> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", self.path.display());
                return Map::new();
            }
        };
        if raw.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::error!(
                    "{} holds {} instead of an object, treating as empty state",
                    self.path.display(),
                    json_kind(&other)
                );
                Map::new()
            }
            Err(e) => {
                tracing::error!(
                    "{} is corrupt ({e}), treating as empty state",
                    self.path.display()
                );
                Map::new()
            }
        }
    }

    /// Serialize and overwrite the whole document.
    ///
    /// Writes to a sibling temp file and renames it into place, so a crash
    /// mid-write leaves the previous document intact rather than a truncated
    /// file.
    pub fn write(&self, doc: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string(doc)
            .map_err(|e| CommishError::Storage(format!("serialize failed: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json.as_bytes())
            .map_err(|e| CommishError::Storage(format!("write {} failed: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            CommishError::Storage(format!("rename into {} failed: {e}", self.path.display()))
        })?;
        tracing::debug!("💾 {} written", self.path.display());
        Ok(())
    }

    /// Read-modify-write of a single top-level key.
    pub fn add(&self, key: &str, value: Value) -> Result<()> {
        let mut doc = self.read();
        doc.insert(key.to_string(), value);
        self.write(&doc)
    }

    /// Read-modify-write removing a top-level key.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut doc = self.read();
        doc.remove(key);
        self.write(&doc)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("commish-store-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_data_dir_is_fatal() {
        let dir = std::env::temp_dir().join("commish-store-no-such-dir");
        std::fs::remove_dir_all(&dir).ok();
        let err = JsonStore::open(&dir, "owners.json").unwrap_err();
        assert!(matches!(err, CommishError::MissingConfiguration(_)));
    }

    #[test]
    fn fresh_store_reads_empty() {
        let dir = temp_dir("fresh");
        let store = JsonStore::open(&dir, "onboarding.json").unwrap();
        assert!(store.path().exists());
        assert!(store.read().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn add_then_read_preserves_existing_keys() {
        let dir = temp_dir("add");
        let store = JsonStore::open(&dir, "owners.json").unwrap();
        store.add("user-1", json!("team-3")).unwrap();
        store.add("user-2", json!("team-7")).unwrap();

        let doc = store.read();
        assert_eq!(doc.get("user-1"), Some(&json!("team-3")));
        assert_eq!(doc.get("user-2"), Some(&json!("team-7")));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn delete_removes_only_named_key() {
        let dir = temp_dir("delete");
        let store = JsonStore::open(&dir, "owners.json").unwrap();
        store.add("a", json!(1)).unwrap();
        store.add("b", json!(2)).unwrap();
        store.delete("a").unwrap();

        let doc = store.read();
        assert!(!doc.contains_key("a"));
        assert_eq!(doc.get("b"), Some(&json!(2)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_reads_as_empty_state() {
        let dir = temp_dir("corrupt");
        let store = JsonStore::open(&dir, "punishments.json").unwrap();
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(store.read().is_empty());

        // And a mutation straightens the file back out.
        store.add("1", json!({"option": true, "picked": false})).unwrap();
        assert_eq!(store.read().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn non_object_document_reads_as_empty_state() {
        let dir = temp_dir("nonobject");
        let store = JsonStore::open(&dir, "onboarding.json").unwrap();
        std::fs::write(store.path(), b"[1, 2, 3]").unwrap();
        assert!(store.read().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
