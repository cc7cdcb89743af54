//! Error types for playlist-dl
//!
//! Errors are split by the component that raises them so callers can apply
//! the right propagation policy:
//! - [`StoreError`] is fail-open: the item is treated as not yet completed
//! - [`ResolutionError`] aborts the run (there is nothing to iterate)
//! - [`FetchError`] fails a single item and the run continues

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for playlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_template")
        key: Option<String>,
    },

    /// Database lifecycle failure (open, migrate)
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Key-value store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Metadata resolution for the top-level URL failed
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Retrieval of a single item failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Item cannot be processed (e.g. no identifier)
    #[error("malformed item: {0}")]
    MalformedItem(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation could not complete
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Metadata resolution errors
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The extractor failed to produce metadata for the URL
    #[error("metadata extraction failed for {url}: {reason}")]
    Extraction {
        /// The URL that was being resolved
        url: String,
        /// The reason extraction failed
        reason: String,
    },

    /// The extractor produced output that is not usable metadata
    #[error("invalid metadata for {url}: {reason}")]
    InvalidMetadata {
        /// The URL that was being resolved
        url: String,
        /// What was wrong with the output
        reason: String,
    },
}

/// Single-item fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetcher ran but did not produce the item
    #[error("fetch failed for {id}: {reason}")]
    Failed {
        /// The item identifier
        id: String,
        /// The reason the fetch failed
        reason: String,
    },

    /// The descriptor carries no URL to fetch from
    #[error("item {id} has no source URL")]
    MissingUrl {
        /// The item identifier
        id: String,
    },

    /// The target directory could not be prepared
    #[error("cannot prepare target {path}: {reason}")]
    Target {
        /// The target path
        path: PathBuf,
        /// The reason preparation failed
        reason: String,
    },
}

impl Error {
    /// Whether this error means the key-value store was unreachable
    ///
    /// Callers use this to decide on fail-open behaviour.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Store(StoreError::Unavailable(_)))
    }
}
