//! File-backed key-value store.
//!
//! The whole store lives in one JSON document:
//! ```text
//! {
//!   "schema_version": 1,
//!   "entries": { "uuid": "[...]", "stats:<uuid>": "{...}", ... }
//! }
//! ```
//! Every mutation is written through to disk, so a refresh that fails half
//! way leaves exactly the entries it managed to write.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current schema version of the store document.
const STORE_SCHEMA_VERSION: u32 = 1;

/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
}

/// String-keyed persistent storage shared by every cache kind.
///
/// Mirrors the browser's local storage: flat string keys, string values,
/// no transactions and no locking.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`, in sorted order.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    schema_version: u32,
    entries: BTreeMap<String, String>,
}

/// JSON-file backed store with schema versioning.
pub struct FileStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl FileStore {
    /// Open or create a store at the given file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let doc = if path.exists() {
            let doc: StoreDocument = serde_json::from_reader(std::fs::File::open(&path)?)?;
            if doc.schema_version != STORE_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: doc.schema_version,
                    expected_version: STORE_SCHEMA_VERSION,
                });
            }
            tracing::debug!(path = %path.display(), entries = doc.entries.len(), "opened store");
            doc
        } else {
            let doc = StoreDocument {
                schema_version: STORE_SCHEMA_VERSION,
                entries: BTreeMap::new(),
            };
            write_document(&path, &doc)?;
            tracing::debug!(path = %path.display(), "created store");
            doc
        };

        Ok(Self { path, doc })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.doc.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.entries.is_empty()
    }

    fn save(&self) -> Result<(), StoreError> {
        write_document(&self.path, &self.doc)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.doc.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.doc.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.doc.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.doc
            .entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// Write to a sibling temp file then rename, so a crash mid-write never
/// leaves a truncated store behind.
fn write_document(path: &Path, doc: &StoreDocument) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    serde_json::to_writer_pretty(std::fs::File::create(&tmp)?, doc)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
