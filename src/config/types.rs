use crate::output::ReportFormat;
use crate::session::BrowserKind;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the invoking script's name in path settings
pub const SCRIPT_PLACEHOLDER: &str = "__script__";

pub const DEFAULT_LEDGER_PATH: &str = "./.ledger/__script__.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "./downloads/__script__/";
pub const DEFAULT_ASSET_DIR: &str = "./assets/";

/// File name of the HTML report template looked up in the asset directory
pub const DEFAULT_TEMPLATE_NAME: &str = "report.html";

/// Where the report of a session goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    /// Interprets `-` as standard output, anything else as a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path),
        }
    }
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Browser window size handed to the browser collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Settings a session runs with
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Report destination
    pub output: OutputDestination,

    /// Report encoding
    pub format: ReportFormat,

    /// Run browsers without a window
    pub headless: bool,

    /// Emit progress logs; incompatible with a stdout report
    pub verbose: bool,

    /// Only log errors
    pub quiet: bool,

    /// Browser launched by `Session::default_browser`
    pub browser: BrowserKind,

    /// Do not download anything and do not write the report or ledger
    pub dry: bool,

    /// Ledger path, may contain `__script__`
    pub ledger_path: String,

    /// Download directory, may contain `__script__`
    pub download_dir: String,

    /// Directory holding browser drivers, extensions and the report template
    pub asset_dir: PathBuf,

    /// Explicit HTML template; defaults to `report.html` in the asset dir
    pub template_path: Option<PathBuf>,

    /// Forget all known keys before the session starts
    pub clear: bool,

    pub screen_size: ScreenSize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output: OutputDestination::Stdout,
            format: ReportFormat::Structured,
            headless: false,
            verbose: false,
            quiet: false,
            browser: BrowserKind::Firefox,
            dry: false,
            ledger_path: DEFAULT_LEDGER_PATH.to_string(),
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            template_path: None,
            clear: false,
            screen_size: ScreenSize::default(),
        }
    }
}

impl SessionConfig {
    /// Ledger path with the script name substituted
    pub fn ledger_path_for(&self, script: &str) -> PathBuf {
        PathBuf::from(resolve_script_path(&self.ledger_path, script))
    }

    /// Download directory with the script name substituted
    pub fn download_dir_for(&self, script: &str) -> PathBuf {
        PathBuf::from(resolve_script_path(&self.download_dir, script))
    }

    /// HTML template location
    pub fn template_path(&self) -> PathBuf {
        self.template_path
            .clone()
            .unwrap_or_else(|| self.asset_dir.join(DEFAULT_TEMPLATE_NAME))
    }
}

/// Replaces every `__script__` in `template` with `script`
pub fn resolve_script_path(template: &str, script: &str) -> String {
    template.replace(SCRIPT_PLACEHOLDER, script)
}

/// Script name derived from a program path: its file stem
///
/// `/usr/local/bin/news.py` and `./target/debug/news` both give `news`.
pub fn script_name_from_path(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

/// On-disk form of a session config; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Output file, `-` for stdout
    pub out: Option<String>,
    pub report: Option<String>,
    pub headless: Option<bool>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub browser: Option<String>,
    pub dry: Option<bool>,
    pub ledger: Option<String>,
    pub download_dir: Option<String>,
    pub asset_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub clear: Option<bool>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
}
