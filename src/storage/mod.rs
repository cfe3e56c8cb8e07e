//! Storage module for the files a session owns
//!
//! This module handles:
//! - The ledger of known item keys (`KnownKeySet`)
//! - Atomic temp-file-then-rename writes shared by the ledger, reports and merges

mod ledger;

pub use ledger::{KnownKeySet, TIMESTAMP_FORMAT};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while reading or writing durable files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt data in {}: {}", .path.display(), .reason)]
    Corrupt { path: PathBuf, reason: String },

    #[error("IO error on {}: {}", .path.display(), .source)]
    Io { path: PathBuf, source: io::Error },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, reason: impl ToString) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Replaces `path` with `contents` so readers see either the old or the new file
///
/// The bytes go to a temporary file in the destination directory, are synced,
/// and the temporary file is then renamed over `path`. Missing parent
/// directories are created.
pub fn atomic_write(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    write_synced(&mut temp, contents).map_err(|e| StorageError::io(path, e))?;

    temp.into_temp_path()
        .persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;

    Ok(())
}

fn write_synced(temp: &mut NamedTempFile, contents: &[u8]) -> io::Result<()> {
    temp.write_all(contents)?;
    temp.flush()?;
    temp.as_file_mut().sync_all()
}
