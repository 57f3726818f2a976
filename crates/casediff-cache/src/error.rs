//! Error types for document retrieval.
//!
//! These never escape [`crate::DocumentCache::get`], which turns them into
//! absence, but sources and `DocumentCache::try_get` report them.

use casediff_catalog::Locator;

/// Errors that can occur while retrieving or decoding a document.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The source has nothing at this locator.
    #[error("document not found: {0}")]
    NotFound(Locator),

    /// The locator would resolve outside the source root.
    #[error("locator {0} must be a relative path inside the data directory")]
    InvalidLocator(Locator),

    /// I/O error from the underlying source.
    #[error("I/O error reading {locator}: {source}")]
    Io {
        locator: Locator,
        #[source]
        source: std::io::Error,
    },

    /// The document bytes are not valid JSON.
    #[error("document {locator} is not valid JSON: {source}")]
    Parse {
        locator: Locator,
        #[source]
        source: serde_json::Error,
    },

    /// The fetch did not settle within the configured timeout.
    #[error("fetching {locator} timed out after {millis} ms")]
    Timeout { locator: Locator, millis: u64 },

    /// The source is temporarily unable to serve the document.
    #[error("source unavailable for {locator}: {reason}")]
    Unavailable { locator: Locator, reason: String },
}

/// Result alias for cache and source operations.
pub type CacheResult<T> = Result<T, CacheError>;
