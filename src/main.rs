//! scrapekit command-line entry point
//!
//! Offline tooling for the reports written by scraping scripts: re-render a
//! JSON report in another format, or merge several reports into one.

use clap::{Parser, Subcommand};
use scrapekit::config::{OutputDestination, DEFAULT_ASSET_DIR, DEFAULT_TEMPLATE_NAME};
use scrapekit::logging::setup_logging;
use scrapekit::output::{parse_report_format, ReportError};
use scrapekit::{load_report, merge_results, ReportFormat, ReportWriter, ScrapeError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// scrapekit: report and merge tooling for scraping scripts
#[derive(Parser, Debug)]
#[command(name = "scrapekit")]
#[command(version)]
#[command(about = "Report and merge tooling for scraping scripts", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON report as json, csv or html
    Report {
        /// JSON report to read
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format: json, csv or html
        #[arg(value_name = "FORMAT", value_parser = parse_report_format)]
        format: ReportFormat,

        /// Output file, or "-" for stdout
        #[arg(value_name = "OUTPUT")]
        output: String,

        /// HTML template containing the items placeholder
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
    },

    /// Concatenate JSON reports into one
    Merge {
        /// Merged report to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Reports to merge, in order
        #[arg(value_name = "INPUT", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Report {
            input,
            format,
            output,
            template,
        } => handle_report(&input, format, &output, template),
        Command::Merge { output, inputs } => handle_merge(&output, &inputs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Handles `report`: re-renders an existing JSON report
fn handle_report(
    input: &Path,
    format: ReportFormat,
    output: &str,
    template: Option<PathBuf>,
) -> Result<(), ScrapeError> {
    let items = load_report(input)?;
    tracing::debug!("Loaded {} items from {}", items.len(), input.display());

    let template =
        template.unwrap_or_else(|| Path::new(DEFAULT_ASSET_DIR).join(DEFAULT_TEMPLATE_NAME));
    let writer = ReportWriter::new(template);
    let destination = OutputDestination::from_arg(output);

    match writer.write_to(&items, &destination, format) {
        Ok(()) => Ok(()),
        Err(ReportError::EmptyReport) => {
            tracing::warn!("{} has no items, nothing written", input.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handles `merge`
fn handle_merge(output: &Path, inputs: &[PathBuf]) -> Result<(), ScrapeError> {
    let summary = merge_results(inputs, output)?;

    if summary.files_skipped > 0 {
        tracing::info!("Skipped {} empty reports", summary.files_skipped);
    }
    Ok(())
}
