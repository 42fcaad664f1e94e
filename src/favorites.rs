//! Favorites list, unique by article url and persisted after every change.

use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::models::NewsItem;
use crate::store::{FAVORITES_KEY, LocalStore, StoreError};

#[derive(Debug)]
pub struct Favorites {
    store: LocalStore,
    items: Vec<NewsItem>,
}

impl Favorites {
    /// Load the persisted favorites. Duplicate urls left behind by an older
    /// writer are collapsed, keeping the first occurrence.
    #[instrument(level = "info", skip_all)]
    pub fn load(store: LocalStore) -> Self {
        let stored: Vec<NewsItem> = store.load(FAVORITES_KEY);
        let before = stored.len();
        let items: Vec<NewsItem> = stored
            .into_iter()
            .unique_by(|item| item.url.clone())
            .collect();
        if items.len() != before {
            warn!(dropped = before - items.len(), "Dropped duplicate stored favorites");
        }
        info!(count = items.len(), "Loaded favorites");
        Self { store, items }
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn contains(&self, url: &str) -> bool {
        self.items.iter().any(|f| f.url == url)
    }

    /// Append `item` unless an entry with the same url exists.
    ///
    /// Returns `Ok(true)` when the list changed.
    #[instrument(level = "info", skip_all, fields(url = %item.url))]
    pub fn add(&mut self, item: NewsItem) -> Result<bool, StoreError> {
        if self.contains(&item.url) {
            return Ok(false);
        }
        self.items.push(item);
        self.persist()?;
        Ok(true)
    }

    /// Remove the entry with `url`. Returns `Ok(true)` when the list changed.
    #[instrument(level = "info", skip(self))]
    pub fn remove(&mut self, url: &str) -> Result<bool, StoreError> {
        let before = self.items.len();
        self.items.retain(|f| f.url != url);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(FAVORITES_KEY, &self.items)
    }
}
