//! CSV reports
//!
//! The header is the union of the field names used by the items: the core
//! fields first (only those any item sets), then extra fields in the order they
//! are first seen. Each item is one row; fields an item lacks are empty.

use crate::collector::Item;
use serde_json::Value;
use std::collections::HashSet;
use std::io::{self, Write};

const SEPARATOR: char = ',';
const LIST_SEPARATOR: &str = ";";

/// Core columns in output order
const CORE_COLUMNS: &[&str] = &["key", "title", "url", "thumb", "tags", "date", "script"];

/// Writes `items` as CSV
pub fn write_tabular<W: Write>(items: &[Item], mut out: W) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    let columns = header_columns(items);
    write_row(&mut out, &columns)?;

    for item in items {
        let row: Vec<String> = columns.iter().map(|column| cell(item, column)).collect();
        write_row(&mut out, &row)?;
    }

    out.flush()
}

/// Column names for a set of items
pub fn header_columns(items: &[Item]) -> Vec<String> {
    let mut columns: Vec<String> = CORE_COLUMNS
        .iter()
        .filter(|column| items.iter().any(|item| has_core_field(item, column)))
        .map(|column| column.to_string())
        .collect();

    let mut seen = HashSet::new();
    for item in items {
        for field in item.extra.keys() {
            if seen.insert(field.as_str()) {
                columns.push(field.clone());
            }
        }
    }

    columns
}

fn has_core_field(item: &Item, column: &str) -> bool {
    match column {
        "key" | "date" | "script" => true,
        "title" => item.title.is_some(),
        "url" => item.url.is_some(),
        "thumb" => item.thumb.is_some(),
        "tags" => !item.tags.is_empty(),
        _ => false,
    }
}

fn cell(item: &Item, column: &str) -> String {
    match column {
        "key" => item.key.clone(),
        "title" => item.title.clone().unwrap_or_default(),
        "url" => item.url.clone().unwrap_or_default(),
        "thumb" => item.thumb.clone().unwrap_or_default(),
        "tags" => item.tags.join(LIST_SEPARATOR),
        "date" => item.date.clone(),
        "script" => item.script.clone(),
        extra => item.extra.get(extra).map(value_cell).unwrap_or_default(),
    }
}

fn value_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(values) if values.iter().all(|v| !v.is_array() && !v.is_object()) => values
            .iter()
            .map(value_cell)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => other.to_string(),
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(out: &mut W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for field in row {
        if !first {
            write!(out, "{}", SEPARATOR)?;
        }
        first = false;

        if needs_quotes(field) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            write!(out, "{}", field)?;
        }
    }
    writeln!(out)
}
