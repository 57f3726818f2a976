//! Fetch-and-cache layer for casediff.
//!
//! Retrieves per-case configuration documents through a [`DocumentSource`]
//! and memoizes the parsed result per `(case, component)` pair.
//!
//! # Guarantees
//!
//! 1. A document is fetched at most once per key while it stays cached.
//! 2. Concurrent requests for a key share the in-flight fetch.
//! 3. Failures (missing file, I/O, timeout, invalid JSON) are logged and
//!    reported as absence; they are never cached, so a later call retries.
//! 4. Cached documents are immutable and handed out as `Arc`s.
//!
//! # Sources
//!
//! - [`FsDocumentSource`] — reads locators relative to a data directory
//! - [`InMemoryDocumentSource`] — map-backed source for tests and embedding

pub mod cache;
pub mod error;
pub mod source;

pub use cache::{CacheStats, DocKey, DocumentCache};
pub use error::{CacheError, CacheResult};
pub use source::{DocumentSource, FsDocumentSource, InMemoryDocumentSource};
