//! HTML reports
//!
//! The page itself is a static template owned by the user; its script renders
//! whatever item list replaces the `__ITEMS__` marker.

use crate::collector::Item;
use crate::output::structured::encode_items_compact;
use crate::output::{ReportError, ReportResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Marker in the template that is replaced by the item list
pub const ITEMS_PLACEHOLDER: &str = "__ITEMS__";

/// A loaded report template
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    path: PathBuf,
    source: String,
}

impl HtmlTemplate {
    /// Reads the template at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(HtmlTemplate)` - The template was read
    /// * `Err(ReportError::TemplateNotFound)` - No file at `path`
    pub fn load(path: &Path) -> ReportResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReportError::TemplateNotFound(path.to_path_buf()),
            _ => ReportError::Io(e),
        })?;

        if !source.contains(ITEMS_PLACEHOLDER) {
            tracing::warn!(
                "Template {} has no {} marker; items will not appear in the page",
                path.display(),
                ITEMS_PLACEHOLDER
            );
        }

        Ok(Self::from_source(path, source))
    }

    pub fn from_source(path: &Path, source: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Substitutes the items into the template
    ///
    /// Fails with `EmptyReport` when there is nothing to show.
    pub fn render(&self, items: &[Item]) -> ReportResult<String> {
        if items.is_empty() {
            return Err(ReportError::EmptyReport);
        }

        let json = encode_items_compact(items)?;
        Ok(self
            .source
            .replace(ITEMS_PLACEHOLDER, &escape_script_json(&json)))
    }
}

/// Keeps `</script>` inside a string value from closing the surrounding tag
fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
