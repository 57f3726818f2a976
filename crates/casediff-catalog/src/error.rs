//! Error types for catalog loading.

/// Errors that can occur while loading a catalog document.
///
/// Lookups never fail; only reading and decoding the document can.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top level of the catalog is not a JSON object.
    #[error("catalog must be a JSON object mapping case ids to components, got {0}")]
    NotAnObject(&'static str),
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
