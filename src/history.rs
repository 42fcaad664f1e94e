//! Search history: distinct query strings, oldest first on disk, newest first
//! on screen.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::store::{LocalStore, SEARCH_HISTORY_KEY, StoreError};

/// How many entries the history panel shows.
pub const HISTORY_DISPLAY_LIMIT: usize = 5;

#[derive(Debug)]
pub struct SearchHistory {
    store: LocalStore,
    entries: Vec<String>,
}

impl SearchHistory {
    #[instrument(level = "info", skip_all)]
    pub fn load(store: LocalStore) -> Self {
        let entries: Vec<String> = store
            .load::<String>(SEARCH_HISTORY_KEY)
            .into_iter()
            .unique()
            .collect();
        debug!(count = entries.len(), "Loaded search history");
        Self { store, entries }
    }

    /// The entries shown in the panel: at most [`HISTORY_DISPLAY_LIMIT`], newest first.
    pub fn recent(&self) -> Vec<&str> {
        self.entries
            .iter()
            .rev()
            .take(HISTORY_DISPLAY_LIMIT)
            .map(String::as_str)
            .collect()
    }

    /// Append `query` unless it is already recorded (exact match).
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, query: &str) -> Result<bool, StoreError> {
        if self.entries.iter().any(|h| h == query) {
            return Ok(false);
        }
        self.entries.push(query.to_string());
        self.persist()?;
        Ok(true)
    }

    /// Remove the entry equal to `query`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, query: &str) -> Result<bool, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|h| h != query);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(SEARCH_HISTORY_KEY, &self.entries)
    }
}
