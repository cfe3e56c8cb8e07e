//! Command-line flags shared by scraping scripts
//!
//! Scripts embed [`ScriptArgs`] into their own `clap` parser so they can add
//! flags of their own:
//!
//! ```no_run
//! use clap::Parser;
//! use scrapekit::config::ScriptArgs;
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     session: ScriptArgs,
//!
//!     /// Only look at the first N pages
//!     #[arg(long, default_value_t = 3)]
//!     pages: u32,
//! }
//!
//! let cli = Cli::parse();
//! let config = cli.session.into_config();
//! ```

use crate::config::types::{
    OutputDestination, ScreenSize, SessionConfig, DEFAULT_ASSET_DIR, DEFAULT_DOWNLOAD_DIR,
    DEFAULT_LEDGER_PATH,
};
use crate::output::{parse_report_format, ReportFormat};
use crate::session::{parse_browser_kind, BrowserKind};
use clap::Args;
use std::path::PathBuf;

/// Session flags
#[derive(Args, Debug, Clone)]
pub struct ScriptArgs {
    /// Report output file, `-` for stdout
    #[arg(long, value_name = "PATH", default_value = "-")]
    pub out: String,

    /// Report type (json|csv|html)
    #[arg(long, value_name = "TYPE", default_value = "json", value_parser = parse_report_format)]
    pub report: ReportFormat,

    /// Browser to drive (firefox|chrome)
    #[arg(long, value_name = "NAME", default_value = "firefox", value_parser = parse_browser_kind)]
    pub browser: BrowserKind,

    /// Run browsers without a window
    #[arg(long)]
    pub headless: bool,

    /// Print progress logs (requires --out)
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not add keys to the ledger, write no report and download nothing
    #[arg(long)]
    pub dry: bool,

    /// Ledger file of known keys; `__script__` is replaced by the script name
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: String,

    /// Download directory; `__script__` is replaced by the script name
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: String,

    /// Directory with browser drivers, extensions and the HTML template
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ASSET_DIR)]
    pub asset_dir: PathBuf,

    /// HTML report template (default: report.html in the asset dir)
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Clear all known keys before starting
    #[arg(long)]
    pub clear: bool,

    /// Browser window size as WIDTH,HEIGHT
    #[arg(long, value_name = "W,H", default_value = "1024,768", value_parser = parse_screen_size)]
    pub screensize: ScreenSize,
}

impl ScriptArgs {
    /// Converts the flags into a session configuration
    ///
    /// Validation happens when the session opens.
    pub fn into_config(self) -> SessionConfig {
        SessionConfig {
            output: OutputDestination::from_arg(&self.out),
            format: self.report,
            headless: self.headless,
            verbose: self.verbose,
            quiet: self.quiet,
            browser: self.browser,
            dry: self.dry,
            ledger_path: self.ledger,
            download_dir: self.download_dir,
            asset_dir: self.asset_dir,
            template_path: self.template,
            clear: self.clear,
            screen_size: self.screensize,
        }
    }
}

/// Parses `WIDTH,HEIGHT`
pub fn parse_screen_size(value: &str) -> Result<ScreenSize, String> {
    let (width, height) = value
        .split_once(',')
        .ok_or_else(|| format!("expected WIDTH,HEIGHT, got '{}'", value))?;

    let width = width
        .trim()
        .parse()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let height = height
        .trim()
        .parse()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;

    Ok(ScreenSize { width, height })
}
