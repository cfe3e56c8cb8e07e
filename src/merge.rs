//! Merging of report files
//!
//! Several scripts (or several runs of one script) each write their own JSON
//! report; `merge_results` concatenates them into one. Items are kept in file
//! order and duplicates are preserved: the inputs are trusted to have been
//! deduplicated by their own ledgers.

use crate::collector::Item;
use crate::output::{encode_items, parse_report};
use crate::storage::{atomic_write, StorageError, StorageResult};
use std::fs;
use std::path::Path;

/// What a merge read and wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    /// Non-empty inputs that were merged
    pub files_read: usize,

    /// Empty inputs that were skipped
    pub files_skipped: usize,

    /// Items written to the output
    pub items: usize,
}

/// Concatenates the items of `inputs` into `output`
///
/// # Arguments
///
/// * `inputs` - Report files, merged in the given order
/// * `output` - Destination; replaced atomically, parent directories created
///
/// # Returns
///
/// * `Ok(MergeSummary)` - The merged output was written
/// * `Err(StorageError::Io)` - An input could not be read
/// * `Err(StorageError::Corrupt)` - A non-empty input is not a report
pub fn merge_results<P: AsRef<Path>>(inputs: &[P], output: &Path) -> StorageResult<MergeSummary> {
    let mut summary = MergeSummary::default();
    let mut items: Vec<Item> = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;

        // A zero-byte report means "no items this run", not corruption
        if text.is_empty() {
            tracing::debug!("Skipping empty report {}", path.display());
            summary.files_skipped += 1;
            continue;
        }

        let file_items = parse_report(&text, path)?;
        tracing::debug!("Read {} items from {}", file_items.len(), path.display());
        items.extend(file_items);
        summary.files_read += 1;
    }

    let bytes = encode_items(&items)?;
    atomic_write(output, &bytes)?;

    summary.items = items.len();
    tracing::info!(
        "Merged {} items from {} files into {}",
        summary.items,
        summary.files_read,
        output.display()
    );

    Ok(summary)
}
