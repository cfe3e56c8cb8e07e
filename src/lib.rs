//! scrapekit: building blocks for small personal scraping scripts
//!
//! A script opens a [`Session`], feeds discovered entries through
//! [`Session::add`], and on a clean exit the session writes a report and
//! persists the ledger of known keys so the next run only reports what is new.

pub mod collector;
pub mod config;
pub mod logging;
pub mod merge;
pub mod output;
pub mod session;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scrapekit operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Report error: {0}")]
    Report(#[from] output::ReportError),

    #[error("Item error: {0}")]
    Item(#[from] collector::ItemError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Download target already exists: {}", .0.display())]
    DestinationConflict(PathBuf),

    #[error("Cannot derive a file name from {url}")]
    MissingFileName { url: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for scrapekit operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use collector::{Item, ItemCollector, NewItem};
pub use config::{OutputDestination, ScriptArgs, SessionConfig};
pub use merge::{merge_results, MergeSummary};
pub use output::{load_report, ReportFormat, ReportWriter};
pub use session::{run_session, Session, SessionSummary};
pub use state::SessionState;
pub use storage::KnownKeySet;
