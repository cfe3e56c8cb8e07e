//! Report writer dispatching on the requested format

use crate::collector::Item;
use crate::config::OutputDestination;
use crate::output::html::HtmlTemplate;
use crate::output::structured::encode_items;
use crate::output::tabular::write_tabular;
use crate::output::{ReportFormat, ReportResult};
use crate::storage::atomic_write;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes item collections as reports
///
/// The writer renders the whole report in memory before touching the
/// destination, so a failure never leaves a partial report behind.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    template_path: PathBuf,
}

impl ReportWriter {
    /// Creates a writer; `template_path` is only read for HTML reports
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Renders `items` in `format`
    ///
    /// # Returns
    ///
    /// * `Ok(bytes)` - The encoded report
    /// * `Err(ReportError::TemplateNotFound)` - HTML template missing
    /// * `Err(ReportError::EmptyReport)` - HTML requested for zero items
    pub fn render(&self, items: &[Item], format: ReportFormat) -> ReportResult<Vec<u8>> {
        match format {
            ReportFormat::Structured => Ok(encode_items(items)?),
            ReportFormat::Tabular => {
                let mut buf = Vec::new();
                write_tabular(items, &mut buf)?;
                Ok(buf)
            }
            ReportFormat::Html => {
                let template = HtmlTemplate::load(&self.template_path)?;
                Ok(template.render(items)?.into_bytes())
            }
        }
    }

    /// Writes the report for `items` to `out`
    pub fn write(
        &self,
        items: &[Item],
        out: &mut dyn Write,
        format: ReportFormat,
    ) -> ReportResult<()> {
        let bytes = self.render(items, format)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Writes the report to stdout or, atomically, to a file
    pub fn write_to(
        &self,
        items: &[Item],
        destination: &OutputDestination,
        format: ReportFormat,
    ) -> ReportResult<()> {
        let bytes = self.render(items, format)?;

        match destination {
            OutputDestination::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(&bytes)?;
                lock.flush()?;
            }
            OutputDestination::File(path) => atomic_write(path, &bytes)?,
        }

        tracing::info!(
            "Report {} items as {} to {}",
            items.len(),
            format,
            destination
        );
        Ok(())
    }
}
