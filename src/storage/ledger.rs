//! Ledger of item keys seen in earlier sessions
//!
//! On disk the ledger is a small JSON record:
//!
//! ```json
//! { "keys": ["https://example.com/a", "https://example.com/b"], "date": "2024-01-01 12:00:00" }
//! ```
//!
//! It is read once when a session opens and written once, atomically, when a
//! session commits. Nothing is written while items are being collected, so a
//! crash mid-session leaves the previous ledger untouched.

use crate::storage::{atomic_write, StorageError, StorageResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Timestamp format used for the ledger `date` and default item dates
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialized form of the ledger
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    keys: BTreeSet<String>,
    date: String,
}

/// Set of item keys that have already been reported
#[derive(Debug, Clone, Default)]
pub struct KnownKeySet {
    keys: HashSet<String>,
    last_persisted_at: Option<String>,
}

impl KnownKeySet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ledger at `path`
    ///
    /// A missing file yields an empty set. A file that exists but does not
    /// decode as a ledger record is reported as `StorageError::Corrupt`
    /// rather than silently treated as empty.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No ledger at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let record: LedgerRecord =
            serde_json::from_str(&content).map_err(|e| StorageError::corrupt(path, e))?;

        tracing::info!(
            "Opened ledger {} from {} ({} keys)",
            path.display(),
            record.date,
            record.keys.len()
        );

        Ok(Self {
            keys: record.keys.into_iter().collect(),
            last_persisted_at: Some(record.date),
        })
    }

    /// Loads the ledger, or starts empty when `reset` is set
    ///
    /// A reset never touches the file: the old record stays in place until
    /// the next `persist` replaces it, so an aborted or dry session keeps it.
    pub fn load_or_reset(path: &Path, reset: bool) -> StorageResult<Self> {
        if reset {
            tracing::info!("Ignoring known keys in {}", path.display());
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Deletes the durable record at `path`; a missing file is not an error
    pub fn clear(path: &Path) -> StorageResult<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::info!("Cleared ledger {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Registers a key; returns false if it was already known
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the known keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// The `date` of the record this set was loaded from or last persisted to
    pub fn last_persisted_at(&self) -> Option<&str> {
        self.last_persisted_at.as_deref()
    }

    /// Writes `{keys, date=now}` to `path` atomically
    ///
    /// Keys are written sorted so the file is stable across runs.
    pub fn persist(&mut self, path: &Path) -> StorageResult<()> {
        let record = LedgerRecord {
            keys: self.keys.iter().cloned().collect(),
            date: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };

        let bytes = serde_json::to_vec_pretty(&record)?;
        atomic_write(path, &bytes)?;

        tracing::debug!(
            "Persisted {} keys to ledger {}",
            record.keys.len(),
            path.display()
        );
        self.last_persisted_at = Some(record.date);
        Ok(())
    }
}
