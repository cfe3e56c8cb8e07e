//! Collection of newly discovered items
//!
//! `ItemCollector` is the dedup gate of a session: an item is only accepted if
//! its key is neither in the ledger nor already collected during this session.
//! Accepted keys are registered in the ledger straight away so both kinds of
//! duplicate are caught by the same check.

mod item;

pub use item::{Item, NewItem, RESERVED_FIELDS};

use crate::storage::KnownKeySet;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when an item cannot be added
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Extra field '{field}' on item '{key}' collides with a reserved field name")]
    ReservedField { key: String, field: String },
}

/// Append-only list of the items reported by one session
#[derive(Debug)]
pub struct ItemCollector {
    items: Vec<Item>,
    seen: HashSet<String>,
    resumed: usize,
    script: String,
    session_start: String,
}

impl ItemCollector {
    /// Creates an empty collector
    ///
    /// # Arguments
    ///
    /// * `script` - Default `script` field for new items
    /// * `session_start` - Default `date` field for new items
    pub fn new(script: impl Into<String>, session_start: impl Into<String>) -> Self {
        Self::seeded(script, session_start, Vec::new())
    }

    /// Creates a collector that continues from items saved by an earlier run
    ///
    /// Seeded items count as already collected: adding one of their keys again
    /// is a no-op.
    pub fn seeded(
        script: impl Into<String>,
        session_start: impl Into<String>,
        items: Vec<Item>,
    ) -> Self {
        let seen = items.iter().map(|item| item.key.clone()).collect();
        Self {
            resumed: items.len(),
            items,
            seen,
            script: script.into(),
            session_start: session_start.into(),
        }
    }

    /// Adds an item unless its key is already known
    ///
    /// # Returns
    ///
    /// * `Ok(Some(item))` - The item was new and has been recorded
    /// * `Ok(None)` - The key was seen before (in the ledger or this session)
    /// * `Err(ItemError)` - The item carries an extra field with a reserved name
    pub fn add(
        &mut self,
        known: &mut KnownKeySet,
        new_item: NewItem,
    ) -> Result<Option<&Item>, ItemError> {
        if known.contains(new_item.key()) || self.seen.contains(new_item.key()) {
            tracing::debug!("Skipping known key: {}", new_item.key());
            return Ok(None);
        }

        if let Some(field) = new_item.reserved_extra() {
            return Err(ItemError::ReservedField {
                key: new_item.key().to_string(),
                field: field.to_string(),
            });
        }

        let item = new_item.build(&self.session_start, &self.script);
        tracing::debug!("+ {}", item.label());

        known.insert(item.key.clone());
        self.seen.insert(item.key.clone());
        self.items.push(item);

        Ok(self.items.last())
    }

    /// Number of items held, including any resumed from an earlier report
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Number of items added by this session
    pub fn new_count(&self) -> usize {
        self.items.len() - self.resumed
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}
