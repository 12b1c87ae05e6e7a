//! Durable state: the status store and the change log.
//!
//! Both files are plain pretty-printed JSON. Loads are lenient (a missing
//! or unparsable file yields an empty default, with a warning for the
//! latter) so a damaged state file degrades to a fresh start instead of
//! blocking checks. Saves are all-or-nothing per file: the snapshot is
//! written to a temporary dotfile in the same directory and renamed over
//! the destination, so a crash mid-write never leaves a torn file. A
//! crash *between* the status-store write and the change-log write can
//! still lose that run's change records, since the next run diffs against
//! the already-updated store; this limitation is inherited from the
//! reference behavior and accepted.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::types::{ChangeRecord, ProbeResult};

/// A failure to persist state. Always fatal to a run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize {path}: {source}")]
    Serialize { path: String, source: serde_json::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Latest known result per target.
///
/// Exactly one entry per target ever checked. A checked target's entry is
/// replaced outright each run; targets not checked this run keep their
/// prior entry. A target with no entry has the implicit status UNKNOWN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusStore {
    entries: BTreeMap<String, ProbeResult>,
}

impl StatusStore {
    /// Load the store, substituting an empty one when the file is absent
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        load_or_default(path, "status store")
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json(path, self)
    }

    pub fn get(&self, target_id: &str) -> Option<&ProbeResult> {
        self.entries.get(target_id)
    }

    /// Replace the entry for the result's target.
    pub fn insert(&mut self, result: ProbeResult) {
        self.entries.insert(result.target_id.clone(), result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only history of status transitions, persisted in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    pub changes: Vec<ChangeRecord>,
}

impl ChangeLog {
    /// Load the log, substituting an empty one when the file is absent or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        load_or_default(path, "change log")
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json(path, self)
    }

    pub fn append(&mut self, records: impl IntoIterator<Item = ChangeRecord>) {
        self.changes.extend(records);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return T::default(),
        Err(err) => {
            warn!("failed to read {what} {}: {err}; starting empty", path.display());
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("failed to parse {what} {}: {err}; starting empty", path.display());
            T::default()
        }
    }
}

/// Write a pretty-printed JSON snapshot atomically: temp file in the same
/// directory, then rename over the destination.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
        path: path.display().to_string(),
        source,
    })?;

    let write_err = |source| StorageError::Write { path: path.display().to_string(), source };

    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&temp_path, json).map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;
    Ok(())
}
