use crate::config::types::{ConfigFile, OutputDestination, ScreenSize, SessionConfig};
use crate::config::validation::validate;
use crate::output::ReportFormat;
use crate::session::BrowserKind;
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a session configuration from a TOML file
///
/// Keys missing from the file keep their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(SessionConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scrapekit::config::load_config;
///
/// let config = load_config(Path::new("scrape.toml")).unwrap();
/// println!("Ledger: {}", config.ledger_path);
/// ```
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let config = apply_config_file(SessionConfig::default(), file)?;

    validate(&config)?;

    Ok(config)
}

/// Overlays the keys present in `file` onto `base`
pub fn apply_config_file(
    mut base: SessionConfig,
    file: ConfigFile,
) -> Result<SessionConfig, ConfigError> {
    if let Some(out) = file.out {
        base.output = OutputDestination::from_arg(&out);
    }
    if let Some(report) = file.report {
        base.format = report
            .parse::<ReportFormat>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
    }
    if let Some(headless) = file.headless {
        base.headless = headless;
    }
    if let Some(verbose) = file.verbose {
        base.verbose = verbose;
    }
    if let Some(quiet) = file.quiet {
        base.quiet = quiet;
    }
    if let Some(browser) = file.browser {
        base.browser = browser
            .parse::<BrowserKind>()
            .map_err(ConfigError::Validation)?;
    }
    if let Some(dry) = file.dry {
        base.dry = dry;
    }
    if let Some(ledger) = file.ledger {
        base.ledger_path = ledger;
    }
    if let Some(download_dir) = file.download_dir {
        base.download_dir = download_dir;
    }
    if let Some(asset_dir) = file.asset_dir {
        base.asset_dir = asset_dir;
    }
    if file.template.is_some() {
        base.template_path = file.template;
    }
    if let Some(clear) = file.clear {
        base.clear = clear;
    }
    base.screen_size = ScreenSize {
        width: file.screen_width.unwrap_or(base.screen_size.width),
        height: file.screen_height.unwrap_or(base.screen_size.height),
    };

    Ok(base)
}
