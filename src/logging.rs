//! Logging setup shared by the CLI and scraping scripts
//!
//! Logs always go to stderr so they can never end up inside a report written
//! to stdout.

use crate::config::SessionConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber
///
/// `verbose` counts `-v` flags; `quiet` limits output to errors. Installing a
/// second subscriber is silently ignored.
pub fn setup_logging(verbose: u8, quiet: bool) {
    install(filter_directive(verbose, quiet));
}

/// Installs the subscriber for a scraping script from its session flags
///
/// `--verbose` shows per-item progress and warnings, `--quiet` only errors.
/// Without either flag the session logs what it opened and wrote.
pub fn setup_for(config: &SessionConfig) {
    install(session_filter_directive(config));
}

fn install(directive: &str) {
    let filter = EnvFilter::new(directive);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .try_init();
}

/// Filter directive for a verbosity level
pub fn filter_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "scrapekit=info,warn",
        1 => "scrapekit=debug,info",
        2 => "scrapekit=trace,debug",
        _ => "trace",
    }
}

/// Filter directive for a script session
pub fn session_filter_directive(config: &SessionConfig) -> &'static str {
    if config.quiet {
        "error"
    } else if config.verbose {
        "scrapekit=debug,warn"
    } else {
        "scrapekit=info,error"
    }
}
