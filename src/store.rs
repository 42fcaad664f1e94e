//! Local key-value storage for persisted collections.
//!
//! Each key is stored as a JSON array in its own file:
//!
//! ```text
//! store_dir/
//! ├── favorites.json      # array of NewsItem
//! └── searchHistory.json  # array of strings
//! ```
//!
//! Reads never fail: a missing or malformed file reads as an empty collection.
//! Writes replace the whole value through a temporary sibling and a rename, so
//! a reader never observes a half-written collection.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::utils::truncate_for_log;

/// Storage key for the favorites list.
pub const FAVORITES_KEY: &str = "favorites";
/// Storage key for the search history.
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not serialize `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write `{key}` to {}: {source}", .path.display())]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory-backed store. Cloning is cheap; clones share the same directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load the collection stored under `key`.
    ///
    /// Absent keys and unparseable content both yield an empty `Vec`.
    #[instrument(level = "debug", skip(self))]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored value; starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Stored value unreadable; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&text) {
            Ok(values) => {
                debug!(count = values.len(), "Loaded stored collection");
                values
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    content_preview = %truncate_for_log(&text, 120),
                    "Stored value malformed; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the collection stored under `key`.
    #[instrument(level = "debug", skip(self, values), fields(count = values.len()))]
    pub fn save<T: Serialize>(&self, key: &str, values: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(values).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &path).map_err(write_err)?;
        debug!(path = %path.display(), "Saved collection");
        Ok(())
    }
}
