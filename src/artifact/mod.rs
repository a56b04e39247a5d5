//! Artifact cache - trial artifacts on disk
//!
//! A flat directory of files named `{trial_id}-{name}.{ext}`; the trial
//! identity namespaces the files, so artifacts of different trials can
//! never collide. Storage is write-once: re-uploading the same artifact
//! after a timed-out first attempt is a safe no-op, which is the designated
//! idempotent-retry mechanism for upload clients.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::trial::ArtifactKind;

/// Filesystem cache for trial artifacts.
///
/// The cache root is an injected dependency; creating it is owned by the
/// process entry point (see [`crate::TrackerBuilder`]).
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    /// Create a locator over the given cache root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic cache path for an artifact:
    /// `{root}/{id}-{name}.{ext}`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if `id` or `name` is not a safe path
    /// fragment (empty, contains separators or `..`).
    pub fn path_for(&self, id: &str, name: &str, kind: ArtifactKind) -> Result<PathBuf> {
        validate_fragment(id)?;
        validate_fragment(name)?;
        Ok(self.root.join(format!("{id}-{name}.{}", kind.extension())))
    }

    /// Check whether an artifact file exists at `path`.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Copy an uploaded temporary file into the cache, write-once.
    ///
    /// If the destination already exists the copy is skipped silently and
    /// the first content is preserved. Returns the cache path either way.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for unsafe fragments,
    /// `Error::StorageUnavailable` if the cache root is missing, and
    /// `Error::Io` for other filesystem failures.
    pub fn store(
        &self,
        source: &Path,
        id: &str,
        name: &str,
        kind: ArtifactKind,
    ) -> Result<PathBuf> {
        let dest = self.path_for(id, name, kind)?;
        // Open the source before touching the destination: an unreadable
        // upload must not leave an empty cache file that the write-once
        // policy would then treat as the first (and final) content.
        let mut reader = fs::File::open(source)?;
        // create_new is the write-once guard: exactly one concurrent
        // uploader wins, every later one sees AlreadyExists.
        match fs::File::options().write(true).create_new(true).open(&dest) {
            Ok(mut file) => {
                if let Err(err) = io::copy(&mut reader, &mut file) {
                    drop(file);
                    let _ = fs::remove_file(&dest);
                    return Err(Error::Io(err));
                }
                debug!(path = %dest.display(), "artifact stored");
                Ok(dest)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %dest.display(), "artifact already cached, keeping first copy");
                Ok(dest)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::StorageUnavailable(
                format!("cache root {} is not available", self.root.display()),
            )),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

/// Reject identifiers that could escape the cache root when joined.
pub(crate) fn validate_fragment(fragment: &str) -> Result<()> {
    if fragment.is_empty() {
        return Err(Error::Validation(
            "artifact identifier must not be empty".to_string(),
        ));
    }
    if fragment.contains("..")
        || fragment.contains(['/', '\\', '\0'])
        || fragment == "."
    {
        return Err(Error::Validation(format!(
            "unsafe artifact identifier: {fragment}"
        )));
    }
    Ok(())
}
