//! Storage configuration.

use std::path::PathBuf;

/// Environment variable naming the JSON file used by [`FileStorage`](crate::FileStorage).
pub const STORAGE_PATH_ENV: &str = "HBNB_STORAGE_PATH";

pub const DEFAULT_STORAGE_PATH: &str = "file.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub file_path: PathBuf,
}

impl StorageConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::with_path(std::env::var(STORAGE_PATH_ENV).ok())
    }

    /// Use `path` when it is set and non-empty, the default file otherwise.
    pub fn with_path(path: Option<String>) -> Self {
        let file_path = path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string());

        Self {
            file_path: PathBuf::from(file_path),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::with_path(None)
    }
}
