//! HTTP transport for plain page fetches and file downloads
//!
//! Requests are blocking: a session is a single-threaded sequence of calls
//! and there is nothing to overlap with. Failures are passed through to the
//! script unchanged; nothing here retries.

use crate::storage::StorageError;
use crate::{Result, ScrapeError};
use reqwest::blocking::Client;
use scraper::Html;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// User agent sent with every request; some sites refuse unknown agents
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; scrapekit/0.1)";

/// Builds the HTTP client used by a session
///
/// # Example
///
/// ```no_run
/// use scrapekit::session::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(ScrapeError::HttpClient)
}

/// Fetches `url` and parses the body as an HTML document
pub fn fetch_document(client: &Client, url: &str) -> Result<Html> {
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|source| http_error(url, source))?;

    Ok(Html::parse_document(&body))
}

/// Streams the body of `url` into `dest`
///
/// A partially written file is removed if the transfer fails.
pub fn download_to(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    let mut response = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|source| http_error(url, source))?;

    let mut file = File::create(dest).map_err(|e| StorageError::io(dest, e))?;
    let copied = response
        .copy_to(&mut file)
        .map_err(|source| http_error(url, source))
        .and_then(|bytes| {
            file.flush().map_err(|e| StorageError::io(dest, e))?;
            Ok(bytes)
        });

    if copied.is_err() {
        let _ = fs::remove_file(dest);
    }
    copied
}

fn http_error(url: &str, source: reqwest::Error) -> ScrapeError {
    ScrapeError::Http {
        url: url.to_string(),
        source,
    }
}

/// Local file name for a download: the last path segment of the URL
///
/// Query strings and fragments are ignored. Returns `None` when the URL has
/// no usable final segment (e.g. `https://example.com/`).
pub fn file_name_from_url(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
        // Not an absolute URL; fall back to whatever follows the last slash
        Err(_) => url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    }
}

/// Ensures the download directory exists
pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
