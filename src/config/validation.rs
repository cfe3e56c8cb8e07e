use crate::config::types::SessionConfig;
use crate::ConfigError;

/// Validates a session configuration before any file is touched
pub fn validate(config: &SessionConfig) -> Result<(), ConfigError> {
    validate_output(config)?;
    validate_paths(config)?;
    validate_screen_size(config)?;
    Ok(())
}

/// Log lines and report bytes must not share standard output
fn validate_output(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.verbose && config.output.is_stdout() {
        return Err(ConfigError::InvalidConfiguration(
            "verbose logging cannot be combined with a report on stdout; pass an output file"
                .to_string(),
        ));
    }
    if config.verbose && config.quiet {
        return Err(ConfigError::InvalidConfiguration(
            "verbose and quiet cannot both be set".to_string(),
        ));
    }
    Ok(())
}

fn validate_paths(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.ledger_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ledger path cannot be empty".to_string(),
        ));
    }

    if config.download_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "download directory cannot be empty".to_string(),
        ));
    }

    if config.ledger_path.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "ledger path must name a file, got '{}'",
            config.ledger_path
        )));
    }

    Ok(())
}

fn validate_screen_size(config: &SessionConfig) -> Result<(), ConfigError> {
    let size = config.screen_size;
    if size.width == 0 || size.height == 0 {
        return Err(ConfigError::Validation(format!(
            "screen size must be non-zero, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(())
}
