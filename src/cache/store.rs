//! Dataset store for persisting fetched API data to disk
//!
//! Stores each dataset as a JSON file stamped with its fetch time. There is
//! no expiry: a stored dataset stays current until a refresh overwrites it.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::config;

/// Wrapper for a dataset stored on disk
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredDataset<T> {
    /// The dataset records
    pub data: T,
    /// When the data was fetched from the API
    pub fetched_at: DateTime<Utc>,
}

/// Manages reading and writing datasets under the data directory
#[derive(Debug, Clone)]
pub struct DataStore {
    /// Directory where dataset files are stored
    data_dir: PathBuf,
}

impl DataStore {
    /// Creates a DataStore in the XDG-compliant data directory
    ///
    /// Returns `None` if the data directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        Some(Self {
            data_dir: config::data_dir()?,
        })
    }

    /// Creates a DataStore over a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the path of the file holding a named dataset
    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    /// Returns a path under the data directory for a non-dataset file
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Ensures the data directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    /// Writes a dataset, stamped with the current time
    pub fn write<T: Serialize>(&self, name: &str, data: &T) -> std::io::Result<()> {
        self.ensure_dir()?;

        let stored = StoredDataset {
            data,
            fetched_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.dataset_path(name), json)
    }

    /// Reads a dataset, if present
    ///
    /// Returns `None` when the file does not exist or does not parse; a
    /// fresh fetch replaces it either way.
    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Option<StoredDataset<T>> {
        let content = fs::read_to_string(self.dataset_path(name)).ok()?;
        match serde_json::from_str(&content) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(name, error = %e, "stored dataset did not parse, ignoring");
                None
            }
        }
    }
}
