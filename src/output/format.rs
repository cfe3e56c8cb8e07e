//! Report encodings
use crate::output::ReportError;
use std::fmt;
use std::str::FromStr;

/// Encoding of a written report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    /// JSON array of items; the only format that can be read back
    Structured,

    /// Comma-separated values, one header row and one row per item
    Tabular,

    /// Static HTML page with the items embedded as JSON
    Html,
}

impl ReportFormat {
    /// Canonical command-line name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "json",
            Self::Tabular => "csv",
            Self::Html => "html",
        }
    }

    /// File extension conventionally used for the format
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn all_formats() -> Vec<Self> {
        vec![Self::Structured, Self::Tabular, Self::Html]
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(Self::Structured),
            "csv" | "tabular" => Ok(Self::Tabular),
            "html" => Ok(Self::Html),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `clap` value parser for report formats
pub fn parse_report_format(s: &str) -> Result<ReportFormat, String> {
    s.parse().map_err(|e: ReportError| e.to_string())
}
