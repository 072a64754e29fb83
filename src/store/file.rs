//! JSON file persistence
//!
//! The whole mapping lives in one pretty-printed JSON object keyed by record
//! id. Reads replace the in-memory view wholesale, writes replace the file
//! wholesale.

use super::record::Record;
use crate::error::{Result, StoreError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Mapping from record id to record
pub type RecordMap = BTreeMap<String, Record>;

/// Backing file for the record mapping
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a file store for the given path (the file need not exist)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full mapping
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty
    /// mapping, and entries that do not decode as records are dropped.
    pub async fn load(&self) -> RecordMap {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Data file {} does not exist yet", self.path.display());
                return RecordMap::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read data file {}: {}. Using empty store.",
                    self.path.display(),
                    e
                );
                return RecordMap::new();
            }
        };

        let entries = match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to parse data file {}: {}. Using empty store.",
                    self.path.display(),
                    e
                );
                return RecordMap::new();
            }
        };

        // One bad entry must not take the others down with it
        let mut records = RecordMap::new();
        for (id, value) in entries {
            match serde_json::from_value::<Record>(value) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(e) => warn!(
                    "Skipping unreadable record {} in {}: {}",
                    id,
                    self.path.display(),
                    e
                ),
            }
        }
        records
    }

    /// Replace the file contents with the given mapping
    ///
    /// Writes a temporary sibling first and renames it into place.
    pub async fn save(&self, records: &RecordMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.persistence_error("prepare directory for", e))?;
        }

        let payload = serde_json::to_vec_pretty(records)
            .map_err(|e| self.persistence_error("encode", e))?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&temp_path, payload).await {
            return Err(self.persistence_error("write", e));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.persistence_error("finalize", e));
        }

        Ok(())
    }

    fn persistence_error(&self, action: &str, e: impl std::fmt::Display) -> StoreError {
        error!("Failed to {} data file {}: {}", action, self.path.display(), e);
        StoreError::Persistence(format!(
            "failed to {} data file {}: {}",
            action,
            self.path.display(),
            e
        ))
    }
}
