//! Output module for session reports
//!
//! This module handles:
//! - Encoding item collections as JSON, CSV or an HTML page
//! - Reading JSON reports back (for resuming and merging)

mod format;
mod html;
mod structured;
mod tabular;
mod writer;

pub use format::{parse_report_format, ReportFormat};
pub use html::{HtmlTemplate, ITEMS_PLACEHOLDER};
pub use structured::{encode_items, encode_items_compact, load_report, parse_report};
pub use tabular::{header_columns, write_tabular};
pub use writer::ReportWriter;

use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("No items to report")]
    EmptyReport,

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to store report: {0}")]
    Storage(#[from] StorageError),
}

impl ReportError {
    /// Returns true for conditions that are reported but not fatal
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyReport)
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;
