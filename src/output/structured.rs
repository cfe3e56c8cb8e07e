//! JSON reports
//!
//! A report is a JSON array of items, pretty-printed with four-space indents.
//! This is also the format merged and resumed from, so it is the only one
//! with a reader.

use crate::collector::Item;
use crate::storage::{StorageError, StorageResult};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Encodes items as a pretty-printed JSON array with a trailing newline
pub fn encode_items(items: &[Item]) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Encodes items as compact JSON for embedding in a page
pub fn encode_items_compact(items: &[Item]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

/// Parses report text; `path` is only used in error messages
///
/// Blank text is an empty report.
pub fn parse_report(text: &str, path: &Path) -> StorageResult<Vec<Item>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|e| StorageError::corrupt(path, e))
}

/// Reads the report at `path`
///
/// # Returns
///
/// * `Ok(items)` - Parsed items; empty if the file is missing or empty
/// * `Err(StorageError::Corrupt)` - The file has content that is not a report
pub fn load_report(path: &Path) -> StorageResult<Vec<Item>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(path, e)),
    };
    parse_report(&text, path)
}
