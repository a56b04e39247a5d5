//! Error types for trialdb

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trialdb error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing required field (e.g. unparsable timestamp,
    /// unsafe artifact name). Surfaced to the caller, not retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No trial matches a query, or a referenced identity does not exist.
    /// An expected outcome; presentation layers map this to 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// The record store or blob cache cannot be reached. Fatal to the
    /// request; a candidate for caller-level retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
