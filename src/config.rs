//! Tracker configuration loaded from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Process-level configuration for a [`crate::Tracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    cache_root: PathBuf,
}

impl TrackerConfig {
    /// Create a configuration with the given artifact cache root.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and
    /// `Error::Validation` if it is not valid JSON for this schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&raw).map_err(|err| {
            Error::Validation(format!(
                "malformed config {}: {err}",
                path.as_ref().display()
            ))
        })
    }

    /// Get the artifact cache root directory.
    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trialdb.json");
        fs::write(&path, r#"{"cache_root": "/var/cache/trialdb"}"#).unwrap();

        let config = TrackerConfig::from_file(&path).unwrap();
        assert_eq!(config.cache_root(), Path::new("/var/cache/trialdb"));
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trialdb.json");
        fs::write(&path, "cache_root: yaml").unwrap();

        assert!(matches!(
            TrackerConfig::from_file(&path),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            TrackerConfig::from_file("/nonexistent/trialdb.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = TrackerConfig::new("cache");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<TrackerConfig>(&json).unwrap(), config);
    }
}
