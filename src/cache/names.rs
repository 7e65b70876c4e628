//! Persistent player-name cache
//!
//! Resolving a player id to a display name costs one API round-trip, and the
//! same small set of frequent submitters shows up across thousands of runs.
//! This cache keeps the id -> names mapping in memory, backed by a single
//! JSON file that is rewritten after every new entry, so a name fetched once
//! is never fetched again, across process runs included.
//!
//! One process at a time is assumed: concurrent writers would race on the
//! read-modify-flush sequence and the last one wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::data::{User, UserNames};

/// Errors that can occur when resolving a player name
#[derive(Debug, Error)]
pub enum LookupError {
    /// The API could not resolve the id, retries included
    #[error("could not resolve user {id}")]
    Resolve {
        id: String,
        #[source]
        source: ApiError,
    },

    /// The user record came back but did not decode
    #[error("user record for {id} did not decode: {reason}")]
    Decode { id: String, reason: String },

    /// The cache file could not be written back
    #[error("failed to persist name cache: {0}")]
    Flush(#[from] std::io::Error),
}

/// Persistent id -> display-name cache
///
/// Construction does not touch the disk; the backing file is loaded once, on
/// the first lookup of the process. A missing file starts an empty cache. A
/// file that no longer parses is treated as empty with a logged warning and
/// gets overwritten by the next successful lookup.
#[derive(Debug)]
pub struct NameCache {
    path: PathBuf,
    names: Option<BTreeMap<String, UserNames>>,
}

impl NameCache {
    /// Opens a cache backed by the given file, without reading it yet
    pub fn open(path: PathBuf) -> Self {
        Self { path, names: None }
    }

    /// Resolves a player id to their international display name
    ///
    /// Cache hits return immediately with no network call and no flush. A
    /// miss fetches `users/{id}` (inheriting the client's full retry
    /// behavior), stores the result, and synchronously rewrites the whole
    /// mapping to disk before returning, so a crash right after a lookup
    /// cannot lose the entry.
    pub async fn lookup(&mut self, api: &ApiClient, id: &str) -> Result<String, LookupError> {
        if let Some(names) = self.ensure_loaded().get(id) {
            return Ok(names.international.clone());
        }

        let record = api
            .fetch_one(&format!("users/{id}"))
            .await
            .map_err(|source| LookupError::Resolve {
                id: id.to_string(),
                source,
            })?;
        let user: User =
            serde_json::from_value(Value::Object(record)).map_err(|e| LookupError::Decode {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        let display_name = user.names.international.clone();
        self.ensure_loaded().insert(id.to_string(), user.names);
        self.flush()?;

        Ok(display_name)
    }

    /// Returns the cached display name for an id, without going to the network
    pub fn cached(&mut self, id: &str) -> Option<String> {
        self.ensure_loaded()
            .get(id)
            .map(|names| names.international.clone())
    }

    /// Loads the backing file on first use
    fn ensure_loaded(&mut self) -> &mut BTreeMap<String, UserNames> {
        let path = &self.path;
        self.names.get_or_insert_with(|| load_names(path))
    }

    /// Rewrites the entire mapping to the backing file
    fn flush(&self) -> std::io::Result<()> {
        let Some(names) = self.names.as_ref() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(names)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)
    }
}

/// Reads the persisted mapping; missing or unreadable files start empty
fn load_names(path: &Path) -> BTreeMap<String, UserNames> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return BTreeMap::new(),
    };
    match serde_json::from_str(&content) {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "name cache file did not parse, starting empty");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> NameCache {
        NameCache::open(dir.path().join("user_names.json"))
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        assert!(cache.cached("v81v7558").is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("user_names.json"), "{{{not json").unwrap();
        let mut cache = cache_in(&dir);

        assert!(cache.cached("v81v7558").is_none());
    }

    #[test]
    fn test_seeded_file_serves_cached_names() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("user_names.json"),
            r#"{"v81v7558": {"international": "Vicas", "japanese": null}}"#,
        )
        .unwrap();
        let mut cache = cache_in(&dir);

        assert_eq!(cache.cached("v81v7558").as_deref(), Some("Vicas"));
        assert!(cache.cached("someone-else").is_none());
    }

    #[test]
    fn test_mapping_roundtrips_through_serde() {
        let mut names = BTreeMap::new();
        names.insert(
            "u1".to_string(),
            UserNames {
                international: "Alice".to_string(),
                japanese: Some("アリス".to_string()),
            },
        );

        let json = serde_json::to_string(&names).unwrap();
        let back: BTreeMap<String, UserNames> = serde_json::from_str(&json).unwrap();

        assert_eq!(back["u1"].international, "Alice");
        assert_eq!(back["u1"].japanese.as_deref(), Some("アリス"));
    }
}
