use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use casediff_catalog::{Catalog, Locator};
use casediff_types::{CaseId, Component, ConfigDocument};
use serde_json::Error as JsonError;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::source::DocumentSource;

/// Cache key: one component of one case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocKey {
    pub case: CaseId,
    pub component: Component,
}

impl DocKey {
    pub fn new(case: CaseId, component: Component) -> Self {
        Self { case, component }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.case, self.component)
    }
}

/// Counters describing cache effectiveness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache (including ones that joined an
    /// in-flight fetch started by another request).
    pub hits: u64,
    /// Fetch attempts issued to the source.
    pub loads: u64,
    /// Fetch attempts that failed.
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    loads: AtomicU64,
    failures: AtomicU64,
}

type Slot = Arc<OnceCell<Arc<ConfigDocument>>>;

/// Memoizing, de-duplicating document cache for one dashboard session.
///
/// Each key owns a `OnceCell`: the first request runs the fetch, concurrent
/// requests for the same key wait on it, and a failed attempt leaves the cell
/// empty so the next request tries again.
pub struct DocumentCache {
    catalog: Arc<Catalog>,
    source: Arc<dyn DocumentSource>,
    fetch_timeout: Option<Duration>,
    slots: RwLock<HashMap<DocKey, Slot>>,
    counters: Counters,
}

impl DocumentCache {
    /// Create a cache resolving locators through `catalog` and fetching
    /// from `source`.
    pub fn new(catalog: Arc<Catalog>, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            catalog,
            source,
            fetch_timeout: None,
            slots: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Abandon fetches that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// The catalog used for locator resolution.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The parsed document for `(case, component)`, or `None` if the case has
    /// no document for that component or it could not be retrieved.
    pub async fn get(&self, case: &CaseId, component: Component) -> Option<Arc<ConfigDocument>> {
        match self.try_get(case, component).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(%case, %component, error = %e, "document fetch failed; treating as absent");
                None
            }
        }
    }

    /// Like [`Self::get`] but reports why a resolved document could not be
    /// loaded. `Ok(None)` still means "no locator".
    pub async fn try_get(
        &self,
        case: &CaseId,
        component: Component,
    ) -> CacheResult<Option<Arc<ConfigDocument>>> {
        let Some(locator) = self.catalog.locator(case, component) else {
            debug!(%case, %component, "no locator; component unavailable for case");
            return Ok(None);
        };
        let key = DocKey::new(case.clone(), component);
        let slot = self.slot(&key);

        let mut loaded_here = false;
        let doc = slot
            .get_or_try_init(|| {
                loaded_here = true;
                self.load(&key, locator)
            })
            .await?;
        if !loaded_here {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "cache hit");
        }
        Ok(Some(Arc::clone(doc)))
    }

    /// The cached document for `key` without fetching.
    pub fn peek(&self, key: &DocKey) -> Option<Arc<ConfigDocument>> {
        self.slots
            .read()
            .expect("cache lock poisoned")
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Returns `true` if a document for `key` is cached.
    pub fn contains(&self, key: &DocKey) -> bool {
        self.peek(key).is_some()
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .expect("cache lock poisoned")
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the entry for `key`; the next request fetches again.
    /// Returns `true` if a document was cached.
    pub fn invalidate(&self, key: &DocKey) -> bool {
        self.slots
            .write()
            .expect("cache lock poisoned")
            .remove(key)
            .is_some_and(|slot| slot.initialized())
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.slots.write().expect("cache lock poisoned").clear();
    }

    /// Snapshot of the hit/load/failure counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &DocKey) -> Slot {
        if let Some(slot) = self.slots.read().expect("cache lock poisoned").get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().expect("cache lock poisoned");
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    async fn load(&self, key: &DocKey, locator: &Locator) -> CacheResult<Arc<ConfigDocument>> {
        self.counters.loads.fetch_add(1, Ordering::Relaxed);
        let result = self.fetch_and_parse(key.component, locator).await;
        match &result {
            Ok(_) => debug!(%key, %locator, "document loaded"),
            Err(_) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    async fn fetch_and_parse(
        &self,
        component: Component,
        locator: &Locator,
    ) -> CacheResult<Arc<ConfigDocument>> {
        let bytes = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.source.fetch(locator))
                .await
                .map_err(|_| CacheError::Timeout {
                    locator: locator.clone(),
                    millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })??,
            None => self.source.fetch(locator).await?,
        };
        let doc = ConfigDocument::from_slice(component, &bytes).map_err(|source: JsonError| {
            CacheError::Parse {
                locator: locator.clone(),
                source,
            }
        })?;
        Ok(Arc::new(doc))
    }
}

impl fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCache")
            .field("cached", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
