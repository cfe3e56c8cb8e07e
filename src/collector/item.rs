//! Item records and the builder used to add them

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field names owned by the core item schema
///
/// Extra fields supplied by a script may not reuse any of these.
pub const RESERVED_FIELDS: &[&str] = &[
    "key",
    "title",
    "url",
    "thumb",
    "thumbnail",
    "tags",
    "date",
    "script",
];

/// A single reported entry
///
/// Fields serialize in declaration order followed by the extra fields in key
/// order, so reports are stable byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Caller-defined identifier used for deduplication
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path or URL of a thumbnail picture
    #[serde(default, alias = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Item date, defaults to the session start time
    #[serde(default)]
    pub date: String,

    /// Name of the script that reported the item
    #[serde(default)]
    pub script: String,

    /// Script-specific fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Text used when logging the item: the title if present, else the key
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }
}

/// Builder for an item that has not been added yet
///
/// Every builder starts with its own empty tag list and extra map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub(crate) key: String,
    pub(crate) title: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) thumb: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) date: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) extra: BTreeMap<String, Value>,
}

/// Empty strings count as "not set", matching how scraped text usually arrives
fn non_empty(value: impl Into<String>) -> Option<String> {
    Some(value.into()).filter(|s| !s.is_empty())
}

impl NewItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url);
        self
    }

    pub fn thumb(mut self, thumb: impl Into<String>) -> Self {
        self.thumb = non_empty(thumb);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Overrides the default date (session start)
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = non_empty(date);
        self
    }

    /// Overrides the reporting script name
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = non_empty(script);
        self
    }

    /// Adds a script-specific field
    pub fn extra(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// Returns the first extra field that collides with the core schema
    pub(crate) fn reserved_extra(&self) -> Option<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .find(|field| RESERVED_FIELDS.contains(field))
    }

    pub(crate) fn build(self, default_date: &str, default_script: &str) -> Item {
        Item {
            key: self.key,
            title: self.title,
            url: self.url,
            thumb: self.thumb,
            tags: self.tags,
            date: self.date.unwrap_or_else(|| default_date.to_string()),
            script: self.script.unwrap_or_else(|| default_script.to_string()),
            extra: self.extra,
        }
    }
}
