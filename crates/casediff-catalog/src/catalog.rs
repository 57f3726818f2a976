//! The [`Catalog`] structure and its JSON loader.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use casediff_types::{CaseId, Component};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CatalogError, CatalogResult};

/// Relative path of one per-case configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Create a locator from a relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of cases with a document, per component.
///
/// Always holds an entry for each of the four components so selectors for
/// components without data can be disabled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Availability(BTreeMap<Component, usize>);

impl Availability {
    /// Cases with data for `component`.
    pub fn count(&self, component: Component) -> usize {
        self.0.get(&component).copied().unwrap_or(0)
    }

    /// Returns `true` if at least `min` cases have data for `component`.
    pub fn is_comparable(&self, component: Component, min: usize) -> bool {
        self.count(component) >= min
    }

    /// Iterate `(component, count)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Component, usize)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }
}

/// Case id → component → document locator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    cases: BTreeMap<CaseId, BTreeMap<Component, Locator>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cases listed, with or without documents.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns `true` if no case is listed.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Register a case. A `None` locator records the case without data for
    /// that component.
    pub fn insert(&mut self, case: CaseId, component: Component, locator: Option<Locator>) {
        let entry = self.cases.entry(case).or_default();
        match locator {
            Some(locator) => {
                entry.insert(component, locator);
            }
            None => {
                entry.remove(&component);
            }
        }
    }

    /// Where the document for `(case, component)` lives, if anywhere.
    /// Unknown cases resolve to `None` like any other absence.
    pub fn locator(&self, case: &CaseId, component: Component) -> Option<&Locator> {
        self.cases.get(case).and_then(|c| c.get(&component))
    }

    /// Returns `true` if `case` has a document for `component`.
    pub fn has_document(&self, case: &CaseId, component: Component) -> bool {
        self.locator(case, component).is_some()
    }

    /// Cases with a document for `component`, sorted by case id.
    pub fn eligible_cases(&self, component: Component) -> Vec<CaseId> {
        self.cases
            .iter()
            .filter(|(_, locators)| locators.contains_key(&component))
            .map(|(case, _)| case.clone())
            .collect()
    }

    /// Restrict `cases` to those with a document for `component`, keeping the
    /// caller's order and dropping repeats.
    pub fn filter_eligible(&self, cases: &[CaseId], component: Component) -> Vec<CaseId> {
        let mut out: Vec<CaseId> = Vec::with_capacity(cases.len());
        for case in cases {
            if self.has_document(case, component) && !out.contains(case) {
                out.push(case.clone());
            }
        }
        out
    }

    /// Cases-with-data count for every component.
    pub fn availability(&self) -> Availability {
        let mut counts: BTreeMap<Component, usize> =
            Component::ALL.iter().map(|c| (*c, 0)).collect();
        for locators in self.cases.values() {
            for component in locators.keys() {
                *counts.entry(*component).or_default() += 1;
            }
        }
        Availability(counts)
    }

    /// Returns `true` if any case has a document for `component`.
    pub fn has_component(&self, component: Component) -> bool {
        self.cases.values().any(|l| l.contains_key(&component))
    }

    /// All listed case ids, sorted.
    pub fn case_ids(&self) -> impl Iterator<Item = &CaseId> {
        self.cases.keys()
    }

    // ---------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------

    /// Build a catalog from its JSON form:
    ///
    /// ```json
    /// { "case.001": { "atm": "namelists/case.001_atm.json", "ocn": null } }
    /// ```
    ///
    /// Entries that cannot be interpreted (unknown component tags, non-string
    /// locators, empty case ids) are skipped with a warning.
    pub fn from_json(json: serde_json::Value) -> CatalogResult<Self> {
        let top = match json {
            serde_json::Value::Object(top) => top,
            other => return Err(CatalogError::NotAnObject(json_kind(&other))),
        };

        let mut catalog = Self::new();
        for (raw_case, components) in top {
            let case = match CaseId::new(raw_case) {
                Ok(case) => case,
                Err(e) => {
                    warn!(error = %e, "skipping catalog entry");
                    continue;
                }
            };
            let serde_json::Value::Object(components) = components else {
                warn!(%case, "catalog entry is not an object; skipping");
                continue;
            };
            catalog.cases.entry(case.clone()).or_default();
            for (tag, locator) in components {
                let component = match tag.parse::<Component>() {
                    Ok(component) => component,
                    Err(_) => {
                        warn!(%case, tag = %tag, "unknown component tag in catalog; skipping");
                        continue;
                    }
                };
                match locator {
                    serde_json::Value::String(path) if !path.is_empty() => {
                        catalog.insert(case.clone(), component, Some(Locator::new(path)));
                    }
                    serde_json::Value::String(_) | serde_json::Value::Null => {}
                    other => {
                        warn!(
                            %case,
                            %component,
                            kind = json_kind(&other),
                            "catalog locator is not a string; treating as absent"
                        );
                    }
                }
            }
        }
        Ok(catalog)
    }

    /// Parse a catalog from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> CatalogResult<Self> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_json(json)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_slice(&bytes)?;
        info!(path = %path.display(), cases = catalog.len(), "catalog loaded");
        Ok(catalog)
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
