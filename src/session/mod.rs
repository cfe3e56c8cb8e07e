//! Session module: the scoped run of a scraping script
//!
//! This module contains:
//! - The session lifecycle (open, collect, commit or abort)
//! - The browser-automation boundary scripts plug their driver into
//! - Blocking HTTP helpers for page fetches and downloads

mod browser;
mod fetcher;
mod lifecycle;

pub use browser::{
    parse_browser_kind, BrowserDriver, BrowserKind, BrowserLauncher, BrowserOptions, NoBrowser,
};
pub use fetcher::{build_http_client, file_name_from_url, USER_AGENT};
pub use lifecycle::{run_session, DownloadOutcome, Session, SessionSummary};
