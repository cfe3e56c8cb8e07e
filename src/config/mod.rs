//! Configuration module for scrapekit sessions
//!
//! A session is configured either from command-line flags (`ScriptArgs`) or
//! from a TOML file (`load_config`). Both produce a `SessionConfig`, which is
//! validated when the session opens.
//!
//! # Example
//!
//! ```no_run
//! use scrapekit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape.toml")).unwrap();
//! println!("Report goes to {}", config.output);
//! ```

mod args;
mod parser;
mod types;
mod validation;

pub use args::{parse_screen_size, ScriptArgs};
pub use parser::{apply_config_file, load_config};
pub use types::{
    resolve_script_path, script_name_from_path, ConfigFile, OutputDestination, ScreenSize,
    SessionConfig, DEFAULT_ASSET_DIR, DEFAULT_DOWNLOAD_DIR, DEFAULT_LEDGER_PATH,
    DEFAULT_TEMPLATE_NAME, SCRIPT_PLACEHOLDER,
};
pub use validation::validate;
