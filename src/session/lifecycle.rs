//! Session lifecycle
//!
//! A session owns the ledger, the collected items and any browsers for the
//! duration of one script run:
//!
//! 1. `open` validates the configuration (before any I/O), loads the ledger
//!    and resumes items from an existing JSON report file
//! 2. the script adds items and calls the HTTP/browser helpers
//! 3. `finish` commits: browsers are closed, then the report is written, then
//!    the ledger is persisted, in that order
//! 4. `abort` (or a dry run, or dropping the session) closes browsers and
//!    writes nothing
//!
//! Because the ledger is the last thing written, a failure anywhere earlier
//! leaves it exactly as it was when the session opened.

use crate::collector::{Item, ItemCollector, NewItem};
use crate::config::{validate, OutputDestination, SessionConfig};
use crate::output::{load_report, ReportFormat, ReportWriter};
use crate::session::browser::{
    BrowserDriver, BrowserKind, BrowserLauncher, BrowserOptions, NoBrowser,
};
use crate::session::fetcher::{
    build_http_client, download_to, ensure_directory, fetch_document, file_name_from_url,
};
use crate::state::SessionState;
use crate::storage::{KnownKeySet, StorageError, TIMESTAMP_FORMAT};
use crate::{Result, ScrapeError};
use chrono::Local;
use reqwest::blocking::Client;
use scraper::Html;
use std::path::{Path, PathBuf};

/// What a finished session did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Whether the report and ledger were written
    pub committed: bool,

    /// Items in the report (resumed plus new)
    pub reported: usize,

    /// Items added during this session
    pub new_items: usize,
}

/// Result of a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was written to this path
    Downloaded(PathBuf),

    /// Dry run; nothing was fetched
    Skipped,
}

/// One run of a scraping script
pub struct Session {
    config: SessionConfig,
    script: String,
    ledger_path: PathBuf,
    download_dir: PathBuf,
    known: KnownKeySet,
    collector: ItemCollector,
    launcher: Box<dyn BrowserLauncher>,
    browsers: Vec<(BrowserKind, Box<dyn BrowserDriver>)>,
    http: Option<Client>,
    state: SessionState,
}

impl Session {
    /// Opens a session for a script that does not use a browser
    pub fn open(config: SessionConfig, script: impl Into<String>) -> Result<Self> {
        Self::open_with_launcher(config, script, Box::new(NoBrowser))
    }

    /// Opens a session
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration; validated before anything is read
    /// * `script` - Script name, substituted into the ledger and download paths
    /// * `launcher` - Starts browsers on first use
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - An active session
    /// * `Err(ScrapeError::Config)` - Contradictory configuration
    /// * `Err(ScrapeError::Storage)` - Ledger or resumed report is unreadable
    pub fn open_with_launcher(
        config: SessionConfig,
        script: impl Into<String>,
        launcher: Box<dyn BrowserLauncher>,
    ) -> Result<Self> {
        validate(&config)?;

        let script = script.into();
        let ledger_path = config.ledger_path_for(&script);
        let download_dir = config.download_dir_for(&script);
        let session_start = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let known = KnownKeySet::load_or_reset(&ledger_path, config.clear)?;

        // Only JSON reports can be read back; other formats start empty
        let resumed = match (&config.output, config.format) {
            (OutputDestination::File(path), ReportFormat::Structured) => load_report(path)?,
            _ => Vec::new(),
        };
        if !resumed.is_empty() {
            tracing::info!(
                "Resuming {} items from {}",
                resumed.len(),
                config.output
            );
        }
        let collector = ItemCollector::seeded(script.clone(), session_start, resumed);

        let mut session = Self {
            config,
            script,
            ledger_path,
            download_dir,
            known,
            collector,
            launcher,
            browsers: Vec::new(),
            http: None,
            state: SessionState::Initializing,
        };
        session.transition(SessionState::Active)?;

        tracing::debug!(
            "Session '{}' open: {} known keys, ledger {}",
            session.script,
            session.known.len(),
            session.ledger_path.display()
        );
        Ok(session)
    }

    fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Session '{}': {} -> {}", self.script, self.state, next);
        self.state = next;
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(ScrapeError::InvalidTransition {
                from: self.state,
                to: SessionState::Active,
            })
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn is_dry(&self) -> bool {
        self.config.dry
    }

    /// Returns true if `key` was reported by this or an earlier session
    pub fn contains(&self, key: &str) -> bool {
        self.known.contains(key)
    }

    /// Adds an item unless its key is already known
    ///
    /// Returns `Ok(None)` for known keys.
    pub fn add(&mut self, item: NewItem) -> Result<Option<&Item>> {
        self.ensure_active()?;
        Ok(self.collector.add(&mut self.known, item)?)
    }

    /// Number of items the report will contain
    pub fn count(&self) -> usize {
        self.collector.count()
    }

    /// Number of items added during this session
    pub fn new_item_count(&self) -> usize {
        self.collector.new_count()
    }

    pub fn items(&self) -> &[Item] {
        self.collector.items()
    }

    /// Returns the browser selected by the configuration, launching it on first use
    pub fn default_browser(&mut self) -> Result<&mut dyn BrowserDriver> {
        let kind = self.config.browser;
        self.browser(kind)
    }

    /// Returns the browser of the given kind, launching it on first use
    pub fn browser(&mut self, kind: BrowserKind) -> Result<&mut dyn BrowserDriver> {
        self.ensure_active()?;

        let index = match self.browsers.iter().position(|(k, _)| *k == kind) {
            Some(index) => index,
            None => {
                let options = BrowserOptions::from_config(kind, &self.config)?;
                tracing::debug!("Launching {} (headless: {})", kind, options.headless);
                let driver = self.launcher.launch(&options)?;
                self.browsers.push((kind, driver));
                self.browsers.len() - 1
            }
        };

        Ok(self.browsers[index].1.as_mut())
    }

    fn client(&mut self) -> Result<Client> {
        let client = match self.http.take() {
            Some(client) => client,
            None => build_http_client()?,
        };
        Ok(self.http.insert(client).clone())
    }

    /// Fetches a page without a browser and parses it
    pub fn fetch_document(&mut self, url: &str) -> Result<Html> {
        self.ensure_active()?;
        let client = self.client()?;
        fetch_document(&client, url)
    }

    /// Downloads `url` into the session's download directory
    ///
    /// # Arguments
    ///
    /// * `url` - Remote file
    /// * `dest` - File name inside the download directory; defaults to the
    ///   last path segment of `url`
    /// * `overwrite` - Replace an existing file instead of failing
    ///
    /// # Returns
    ///
    /// * `Ok(DownloadOutcome::Downloaded(path))` - File written
    /// * `Ok(DownloadOutcome::Skipped)` - Dry run
    /// * `Err(ScrapeError::DestinationConflict)` - File exists and `overwrite` is false
    pub fn download(
        &mut self,
        url: &str,
        dest: Option<&str>,
        overwrite: bool,
    ) -> Result<DownloadOutcome> {
        self.ensure_active()?;
        if self.config.dry {
            tracing::debug!("Dry run, not downloading {}", url);
            return Ok(DownloadOutcome::Skipped);
        }

        let name = match dest {
            Some(name) => name.to_string(),
            None => file_name_from_url(url).ok_or_else(|| ScrapeError::MissingFileName {
                url: url.to_string(),
            })?,
        };

        ensure_directory(&self.download_dir)
            .map_err(|e| StorageError::io(&self.download_dir, e))?;
        let dest_path = self.download_dir.join(name);
        if !overwrite && dest_path.exists() {
            return Err(ScrapeError::DestinationConflict(dest_path));
        }

        let client = self.client()?;
        let bytes = download_to(&client, url, &dest_path)?;
        tracing::debug!("Downloaded {} ({} bytes) to {}", url, bytes, dest_path.display());

        Ok(DownloadOutcome::Downloaded(dest_path))
    }

    /// Closes every launched browser
    ///
    /// Close failures are logged and do not stop the remaining browsers from
    /// being closed.
    fn release_browsers(&mut self) {
        for (kind, mut driver) in self.browsers.drain(..) {
            if let Err(e) = driver.close() {
                tracing::warn!("Failed to close {}: {}", kind, e);
            }
        }
    }

    /// Ends the session normally
    ///
    /// Closes browsers, then writes the report and persists the ledger. In dry
    /// mode this behaves like [`Session::abort`]. An empty HTML report is
    /// logged as a warning and does not prevent the ledger from being saved;
    /// any other write failure is returned and the ledger is left untouched.
    pub fn finish(mut self) -> Result<SessionSummary> {
        if self.config.dry {
            tracing::info!("Dry run, not writing report or ledger");
            return self.abort_in_place();
        }

        self.transition(SessionState::Committing)?;
        self.release_browsers();

        let committed = self.commit();
        self.state = SessionState::Closed;
        committed
    }

    fn commit(&mut self) -> Result<SessionSummary> {
        let writer = ReportWriter::new(self.config.template_path());
        let items = self.collector.items();

        match writer.write_to(items, &self.config.output, self.config.format) {
            Ok(()) => {}
            // Warnings are only worth surfacing to a verbose run
            Err(e) if e.is_warning() && self.config.verbose => tracing::warn!("{}", e),
            Err(e) if e.is_warning() => tracing::debug!("{}", e),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(
            "Write {} new items to {}",
            self.collector.new_count(),
            self.config.output
        );

        self.known.persist(&self.ledger_path)?;

        Ok(SessionSummary {
            committed: true,
            reported: self.collector.count(),
            new_items: self.collector.new_count(),
        })
    }

    /// Ends the session without writing anything
    pub fn abort(mut self) -> SessionSummary {
        match self.abort_in_place() {
            Ok(summary) => summary,
            // Only reachable if the session already left the active state
            Err(_) => self.summary(false),
        }
    }

    fn abort_in_place(&mut self) -> Result<SessionSummary> {
        self.transition(SessionState::Aborting)?;
        self.release_browsers();
        self.state = SessionState::Closed;

        tracing::debug!(
            "Session '{}' aborted, discarding {} new items",
            self.script,
            self.collector.new_count()
        );
        Ok(self.summary(false))
    }

    fn summary(&self, committed: bool) -> SessionSummary {
        SessionSummary {
            committed,
            reported: if committed { self.collector.count() } else { 0 },
            new_items: self.collector.new_count(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        tracing::debug!(
            "Session '{}' dropped while {}, discarding changes",
            self.script,
            self.state
        );
        self.release_browsers();
        self.state = SessionState::Closed;
    }
}

/// Runs `body` inside a session and commits or aborts depending on its result
///
/// On `Ok` the session is finished (report written, ledger persisted unless
/// dry). On `Err` the session is aborted and the error is returned unchanged.
///
/// # Example
///
/// ```no_run
/// use scrapekit::{run_session, NewItem, ScrapeError, Session, SessionConfig};
///
/// let session = Session::open(SessionConfig::default(), "example")?;
/// let (added, summary) = run_session(session, |session| {
///     let doc = session.fetch_document("https://example.com/")?;
///     let mut added = 0;
///     for link in doc.select(&scraper::Selector::parse("a[href]").unwrap()) {
///         let href = link.value().attr("href").unwrap_or_default();
///         if session.add(NewItem::new(href).url(href))?.is_some() {
///             added += 1;
///         }
///     }
///     Ok::<_, ScrapeError>(added)
/// })?;
/// # Ok::<(), ScrapeError>(())
/// ```
pub fn run_session<T, E, F>(
    mut session: Session,
    body: F,
) -> std::result::Result<(T, SessionSummary), E>
where
    F: FnOnce(&mut Session) -> std::result::Result<T, E>,
    E: From<ScrapeError>,
{
    match body(&mut session) {
        Ok(value) => {
            let summary = session.finish()?;
            Ok((value, summary))
        }
        Err(e) => {
            session.abort();
            Err(e)
        }
    }
}
