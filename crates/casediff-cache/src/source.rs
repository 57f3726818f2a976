use std::collections::{HashMap, HashSet};
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use casediff_catalog::Locator;

use crate::error::{CacheError, CacheResult};

/// Where per-case documents are read from.
///
/// Implementations return raw bytes; decoding is the cache's job so every
/// source gets the same lenient parsing.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Retrieve the bytes behind `locator`.
    async fn fetch(&self, locator: &Locator) -> CacheResult<Vec<u8>>;
}

/// Reads locators as paths relative to a data directory (the exported
/// `web/data` tree).
#[derive(Clone, Debug)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a locator, refusing absolute paths and `..` segments.
    pub fn resolve(&self, locator: &Locator) -> CacheResult<PathBuf> {
        let rel = Path::new(locator.as_str());
        let escapes = rel.components().any(|c| {
            matches!(
                c,
                PathComponent::ParentDir | PathComponent::RootDir | PathComponent::Prefix(_)
            )
        });
        if escapes || locator.as_str().is_empty() {
            return Err(CacheError::InvalidLocator(locator.clone()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn fetch(&self, locator: &Locator) -> CacheResult<Vec<u8>> {
        let path = self.resolve(locator)?;
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CacheError::NotFound(locator.clone())
            } else {
                CacheError::Io {
                    locator: locator.clone(),
                    source,
                }
            }
        })
    }
}

/// Map-backed source for tests and embedding.
///
/// Counts every fetch, can simulate failures per locator and an artificial
/// latency to widen race windows in concurrency tests.
pub struct InMemoryDocumentSource {
    documents: RwLock<HashMap<String, Vec<u8>>>,
    failing: RwLock<HashSet<String>>,
    fetches: AtomicUsize,
    delay: Option<Duration>,
    delays: HashMap<String, Duration>,
}

impl InMemoryDocumentSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            fetches: AtomicUsize::new(0),
            delay: None,
            delays: HashMap::new(),
        }
    }

    /// Sleep for `delay` inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delay` when fetching `locator`, instead of the shared delay.
    pub fn with_delay_for(mut self, locator: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(locator.into(), delay);
        self
    }

    /// Store raw bytes under `locator`.
    pub fn insert(&self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .expect("document lock poisoned")
            .insert(locator.into(), bytes.into());
    }

    /// Store a JSON document under `locator`.
    pub fn insert_json(&self, locator: impl Into<String>, json: &serde_json::Value) {
        self.insert(locator, json.to_string());
    }

    /// Make fetches of `locator` fail until [`Self::heal`] is called.
    pub fn fail(&self, locator: impl Into<String>) {
        self.failing
            .write()
            .expect("failure lock poisoned")
            .insert(locator.into());
    }

    /// Stop failing fetches of `locator`.
    pub fn heal(&self, locator: &str) {
        self.failing
            .write()
            .expect("failure lock poisoned")
            .remove(locator);
    }

    /// Total number of fetches served or failed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryDocumentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.documents.read().expect("document lock poisoned").len();
        f.debug_struct("InMemoryDocumentSource")
            .field("document_count", &count)
            .field("fetches", &self.fetch_count())
            .finish()
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn fetch(&self, locator: &Locator) -> CacheResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(locator.as_str()).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failing
            .read()
            .expect("failure lock poisoned")
            .contains(locator.as_str());
        if failing {
            return Err(CacheError::Unavailable {
                locator: locator.clone(),
                reason: "simulated failure".into(),
            });
        }
        self.documents
            .read()
            .expect("document lock poisoned")
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| CacheError::NotFound(locator.clone()))
    }
}
