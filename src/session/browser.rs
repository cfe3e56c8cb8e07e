//! Browser-automation boundary
//!
//! scrapekit does not drive browsers itself. A script plugs in a
//! [`BrowserLauncher`] that knows how to start a WebDriver (or any other
//! automation backend); the session decides when to launch it and guarantees
//! that every launched driver is closed when the session ends.

use crate::config::SessionConfig;
use crate::{Result, ScrapeError};
use scraper::Html;
use std::fmt;
use std::str::FromStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BrowserKind {
    #[default]
    Firefox,
    Chrome,
}

impl BrowserKind {
    /// File name of the WebDriver binary expected in the asset directory
    pub fn driver_binary(&self) -> &'static str {
        match self {
            Self::Firefox => "geckodriver",
            Self::Chrome => "chromedriver",
        }
    }

    /// File extension of browser extensions for this browser
    pub fn extension_suffix(&self) -> &'static str {
        match self {
            Self::Firefox => ".xpi",
            Self::Chrome => ".crx",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firefox" => Ok(Self::Firefox),
            "chrome" | "chromium" => Ok(Self::Chrome),
            _ => Err(format!("unsupported browser '{}', expected firefox or chrome", s)),
        }
    }
}

/// Value parser for `--browser`
pub fn parse_browser_kind(s: &str) -> std::result::Result<BrowserKind, String> {
    s.parse()
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Firefox => write!(f, "firefox"),
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// Everything a launcher needs to start a browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub kind: BrowserKind,
    pub headless: bool,
    pub width: u32,
    pub height: u32,
    /// WebDriver binary
    pub executable: PathBuf,
    /// Extensions to install, sorted by file name
    pub extensions: Vec<PathBuf>,
}

impl BrowserOptions {
    /// Builds launch options from the session configuration
    ///
    /// Extensions are the matching files in the asset directory. Headless
    /// Chrome cannot load extensions, so none are passed in that case. A
    /// missing asset directory simply means no extensions.
    pub fn from_config(kind: BrowserKind, config: &SessionConfig) -> Result<Self> {
        let extensions = if kind == BrowserKind::Chrome && config.headless {
            Vec::new()
        } else {
            find_extensions(&config.asset_dir, kind)?
        };

        for extension in &extensions {
            tracing::debug!("Add {} extension: {}", kind, extension.display());
        }

        Ok(Self {
            kind,
            headless: config.headless,
            width: config.screen_size.width,
            height: config.screen_size.height,
            executable: config.asset_dir.join(kind.driver_binary()),
            extensions,
        })
    }
}

fn find_extensions(asset_dir: &Path, kind: BrowserKind) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(asset_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Asset directory {} does not exist", asset_dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut extensions = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(kind.extension_suffix()));
        if matches && path.is_file() {
            extensions.push(path);
        }
    }
    extensions.sort();

    Ok(extensions)
}

/// A running browser
pub trait BrowserDriver {
    /// Navigates to `url` and waits for the page to load
    fn get(&mut self, url: &str) -> Result<()>;

    /// Returns the rendered DOM of the current page as HTML
    fn page_source(&mut self) -> Result<String>;

    /// Shuts the browser down
    fn close(&mut self) -> Result<()>;

    /// Parses the rendered DOM of the current page
    fn document(&mut self) -> Result<Html> {
        let source = self.page_source()?;
        Ok(Html::parse_document(&source))
    }
}

/// Starts browsers on demand
pub trait BrowserLauncher {
    fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn BrowserDriver>>;
}

/// Launcher for scripts that never use a browser
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBrowser;

impl BrowserLauncher for NoBrowser {
    fn launch(&self, options: &BrowserOptions) -> Result<Box<dyn BrowserDriver>> {
        Err(ScrapeError::Browser(format!(
            "no browser launcher configured, cannot start {}",
            options.kind
        )))
    }
}
