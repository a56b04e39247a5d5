//! # trialdb: Embedded Experiment-Tracking Core
//!
//! trialdb records **trials** (runs of an experiment), attaches artifacts
//! (CSV data streams and PDF plots) to them, and resolves the most recent
//! successful trial matching a set of free parameters. It is the logic
//! layer behind a tracking service: HTTP routing, HTML rendering, and
//! multipart upload plumbing live in a thin presentation layer that calls
//! into this crate.
//!
//! ## Design
//!
//! - A trial is an explicit record (`project`, `experiment`, `timestamp`,
//!   `success`, artifact sets) plus an open map of free parameters, so
//!   reserved fields can never collide with experimental conditions.
//! - The record store and the artifact cache root are injected
//!   dependencies; [`MemoryRecordStore`] is the bundled backend.
//! - Artifact storage is write-once, which makes upload retries idempotent.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trialdb::{ArtifactKind, Tracker};
//!
//! # async fn example() -> trialdb::Result<()> {
//! let tracker = Tracker::builder().cache_root("cache").build()?;
//!
//! let id = tracker
//!     .repository()
//!     .create(&serde_json::json!({
//!         "project": "vision",
//!         "experiment": "augmentation",
//!         "timestamp": "2024-05-01T10:00:00Z",
//!         "lr": "0.01",
//!     }))
//!     .await?;
//! tracker.repository().mark_success(&id).await?;
//!
//! // Serve the newest successful trial's loss curve for lr = 0.01.
//! let filters = std::collections::BTreeMap::from([
//!     ("lr".to_string(), trialdb::Value::from("0.01")),
//! ]);
//! let path = tracker
//!     .resolve_artifact("vision", "augmentation", &filters, "loss", ArtifactKind::Datastream)
//!     .await?;
//! # let _ = path;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod store;
pub mod trial;

pub use artifact::ArtifactCache;
pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use store::{MemoryRecordStore, RecordStore, Sort, TrialQuery};
pub use trial::{ArtifactKind, SelectorSet, TrialRecord, TrialRepository, Value};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Experiment-tracking service facade.
///
/// Owns a [`TrialRepository`] and an [`ArtifactCache`] and wires them
/// together for artifact resolution by query. Construct with
/// [`Tracker::builder`] for the bundled in-memory store, or
/// [`Tracker::new`] to inject another [`RecordStore`] implementation.
pub struct Tracker<S = MemoryRecordStore> {
    repository: TrialRepository<S>,
    artifacts: ArtifactCache,
}

impl Tracker<MemoryRecordStore> {
    /// Create a tracker builder using the bundled in-memory store.
    #[must_use]
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::default()
    }
}

impl<S: RecordStore> Tracker<S> {
    /// Create a tracker over an injected store and cache root.
    ///
    /// The cache root must already exist; [`TrackerBuilder::build`]
    /// creates it for the bundled backend.
    pub fn new(store: S, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            repository: TrialRepository::new(store),
            artifacts: ArtifactCache::new(cache_root),
        }
    }

    /// Get the trial repository.
    #[must_use]
    pub const fn repository(&self) -> &TrialRepository<S> {
        &self.repository
    }

    /// Get the artifact cache.
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactCache {
        &self.artifacts
    }

    /// Resolve the newest successful trial's artifact for the given
    /// parameters, without the caller knowing the trial identity.
    ///
    /// Composes [`TrialRepository::find_latest`] with
    /// [`ArtifactCache::path_for`].
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no successful trial matches or the
    /// resolved cache file does not exist on disk, and `Error::Validation`
    /// for unsafe artifact names.
    pub async fn resolve_artifact(
        &self,
        project: &str,
        experiment: &str,
        extra_filters: &BTreeMap<String, Value>,
        name: &str,
        kind: ArtifactKind,
    ) -> Result<PathBuf> {
        let trial = self
            .repository
            .find_latest(project, experiment, extra_filters)
            .await?;
        let path = self.artifacts.path_for(trial.id(), name, kind)?;
        if self.artifacts.exists(&path) {
            Ok(path)
        } else {
            Err(Error::NotFound(format!(
                "artifact {name} for trial {}",
                trial.id()
            )))
        }
    }
}

/// Builder for a [`Tracker`] over the bundled in-memory store.
#[derive(Debug, Default)]
pub struct TrackerBuilder {
    cache_root: Option<PathBuf>,
    capacity: Option<usize>,
}

impl TrackerBuilder {
    /// Set the artifact cache root directory.
    #[must_use]
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    /// Pre-allocate store capacity for the expected trial count.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Apply a loaded [`TrackerConfig`].
    #[must_use]
    pub fn config(mut self, config: &TrackerConfig) -> Self {
        self.cache_root = Some(config.cache_root().to_path_buf());
        self
    }

    /// Build the tracker, creating the cache root if absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if no cache root was configured and
    /// `Error::StorageUnavailable` if the cache root cannot be created.
    pub fn build(self) -> Result<Tracker<MemoryRecordStore>> {
        let cache_root = self
            .cache_root
            .ok_or_else(|| Error::Validation("cache root is required".to_string()))?;
        ensure_dir(&cache_root)?;

        let store = self
            .capacity
            .map_or_else(MemoryRecordStore::new, MemoryRecordStore::with_capacity);
        Ok(Tracker::new(store, cache_root))
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| {
        Error::StorageUnavailable(format!(
            "cannot create cache root {}: {err}",
            path.display()
        ))
    })
}
