use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use casediff_cache::{DocumentCache, DocumentSource, FsDocumentSource};
use casediff_catalog::{Availability, Catalog};
use casediff_diff::{compute_selection_diff, DiffTable};
use casediff_types::{CaseId, CaseSelection, Component, ConfigDocument};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};

/// Outcome of [`CompareSession::refresh`].
#[derive(Debug)]
pub enum Refresh {
    /// The comparison for the selection that was current when the refresh
    /// started and is still current now.
    Table(DiffTable),
    /// The component or selection changed while documents were loading.
    /// Fetched documents stay cached; the caller should refresh again.
    Superseded,
    /// Nothing is selected.
    NoSelection,
}

impl Refresh {
    /// The table, if the refresh produced one.
    pub fn table(self) -> Option<DiffTable> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct SelectorState {
    component: Component,
    selection: Option<CaseSelection>,
    /// Bumped on every change of component or selection.
    generation: u64,
}

impl SelectorState {
    fn touch(&mut self) {
        self.generation += 1;
    }
}

/// Selector state plus the document cache for one dashboard view.
pub struct CompareSession {
    cache: Arc<DocumentCache>,
    state: Mutex<SelectorState>,
}

impl CompareSession {
    /// Start a session on the first component that has any data (`atm` if
    /// the catalog is empty), with nothing selected.
    pub fn new(cache: Arc<DocumentCache>) -> Self {
        let component = Component::ALL
            .into_iter()
            .find(|c| cache.catalog().has_component(*c))
            .unwrap_or(Component::Atm);
        Self {
            cache,
            state: Mutex::new(SelectorState {
                component,
                selection: None,
                generation: 0,
            }),
        }
    }

    /// Build a session over `catalog` and `source`.
    pub fn with_source(
        catalog: Catalog,
        source: Arc<dyn DocumentSource>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        let mut cache = DocumentCache::new(Arc::new(catalog), source);
        if let Some(timeout) = fetch_timeout {
            cache = cache.with_timeout(timeout);
        }
        Self::new(Arc::new(cache))
    }

    /// Load `catalog_file` from `data_dir` and read documents from the same
    /// directory.
    pub fn open(
        data_dir: &Path,
        catalog_file: &str,
        fetch_timeout: Option<Duration>,
    ) -> SessionResult<Self> {
        let catalog = Catalog::load(&data_dir.join(catalog_file))?;
        info!(
            data_dir = %data_dir.display(),
            cases = catalog.len(),
            "comparison session opened"
        );
        Ok(Self::with_source(
            catalog,
            Arc::new(FsDocumentSource::new(data_dir)),
            fetch_timeout,
        ))
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    pub fn catalog(&self) -> &Catalog {
        self.cache.catalog()
    }

    /// Cases with data, per component. Components at zero cannot be chosen.
    pub fn availability(&self) -> Availability {
        self.catalog().availability()
    }

    pub fn component(&self) -> Component {
        self.state.lock().expect("session lock poisoned").component
    }

    pub fn selection(&self) -> Option<CaseSelection> {
        self.state
            .lock()
            .expect("session lock poisoned")
            .selection
            .clone()
    }

    /// Changes every time the component or the selection changes.
    pub fn generation(&self) -> u64 {
        self.state.lock().expect("session lock poisoned").generation
    }

    /// Cases that can be selected for the active component, sorted by id.
    pub fn eligible_cases(&self) -> Vec<CaseId> {
        self.catalog().eligible_cases(self.component())
    }

    /// Switch the active component.
    ///
    /// Selected cases without a document for the new component are dropped;
    /// if fewer than two remain the selection is cleared.
    pub fn set_component(&self, component: Component) -> SessionResult<()> {
        if !self.catalog().has_component(component) {
            return Err(SessionError::ComponentUnavailable(component));
        }

        let mut state = self.state.lock().expect("session lock poisoned");
        if state.component == component {
            return Ok(());
        }
        let kept = state
            .selection
            .as_ref()
            .map(|sel| self.catalog().filter_eligible(sel.cases(), component))
            .unwrap_or_default();
        let dropped = state.selection.as_ref().map_or(0, |s| s.len()) - kept.len();

        state.component = component;
        state.selection = CaseSelection::new(kept).ok();
        state.touch();
        debug!(
            %component,
            dropped,
            selected = state.selection.as_ref().map_or(0, CaseSelection::len),
            "component changed"
        );
        Ok(())
    }

    /// Replace the selection. Every case must have a document for the
    /// active component.
    pub fn select(&self, cases: Vec<CaseId>) -> SessionResult<()> {
        let selection = CaseSelection::new(cases)?;

        let mut state = self.state.lock().expect("session lock poisoned");
        let component = state.component;
        if let Some(case) = selection
            .cases()
            .iter()
            .find(|c| !self.catalog().has_document(c, component))
        {
            return Err(SessionError::NotEligible {
                case: case.clone(),
                component,
            });
        }

        debug!(%component, cases = selection.len(), "selection changed");
        state.selection = Some(selection);
        state.touch();
        Ok(())
    }

    pub fn clear_selection(&self) {
        let mut state = self.state.lock().expect("session lock poisoned");
        if state.selection.take().is_some() {
            state.touch();
        }
    }

    /// Fetch every selected document and compute the comparison.
    ///
    /// All fetches run concurrently and are awaited together. Documents are
    /// placed by selection index, so the table never depends on which fetch
    /// finished first. A case whose fetch fails shows as missing.
    pub async fn refresh(&self) -> Refresh {
        let (component, selection, generation) = {
            let state = self.state.lock().expect("session lock poisoned");
            match &state.selection {
                Some(sel) => (state.component, sel.clone(), state.generation),
                None => return Refresh::NoSelection,
            }
        };

        let mut tasks = JoinSet::new();
        for (index, case) in selection.cases().iter().cloned().enumerate() {
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move { (index, cache.get(&case, component).await) });
        }

        let mut documents: Vec<Option<Arc<ConfigDocument>>> = vec![None; selection.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, doc)) => documents[index] = doc,
                Err(e) => warn!(%component, error = %e, "fetch task failed"),
            }
        }

        if self.generation() != generation {
            debug!(%component, generation, "refresh superseded");
            return Refresh::Superseded;
        }

        let borrowed: Vec<Option<&ConfigDocument>> =
            documents.iter().map(|d| d.as_deref()).collect();
        let table = compute_selection_diff(component, &selection, &borrowed);
        info!(
            %component,
            cases = selection.len(),
            loaded = documents.iter().filter(|d| d.is_some()).count(),
            rows = table.row_count(),
            divergent = table.divergent_count(),
            "comparison refreshed"
        );
        Refresh::Table(table)
    }

    /// Select `cases` for `component` and refresh.
    pub async fn compare(
        &self,
        component: Component,
        cases: Vec<CaseId>,
    ) -> SessionResult<DiffTable> {
        self.set_component(component)?;
        self.select(cases)?;
        match self.refresh().await {
            Refresh::Table(table) => Ok(table),
            Refresh::Superseded | Refresh::NoSelection => Err(SessionError::Superseded),
        }
    }
}

impl std::fmt::Debug for CompareSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompareSession")
            .field("state", &self.state)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casediff_cache::InMemoryDocumentSource;
    use casediff_catalog::Locator;
    use serde_json::json;

    fn id(s: &str) -> CaseId {
        CaseId::new(s).unwrap()
    }

    fn session() -> CompareSession {
        let mut catalog = Catalog::new();
        for case in ["A", "B", "C"] {
            catalog.insert(id(case), Component::Atm, Some(Locator::new(format!("{case}/atm.json"))));
        }
        catalog.insert(id("A"), Component::Ocn, Some(Locator::new("A/ocn.json")));
        catalog.insert(id("B"), Component::Ocn, Some(Locator::new("B/ocn.json")));
        let source = InMemoryDocumentSource::new();
        for case in ["A", "B", "C"] {
            source.insert_json(format!("{case}/atm.json"), &json!({"cam": {"case": case}}));
        }
        source.insert_json("A/ocn.json", &json!({"MOM_input": {"DT": 1800}}));
        source.insert_json("B/ocn.json", &json!({"MOM_input": {"DT": 900}}));
        CompareSession::with_source(catalog, Arc::new(source), None)
    }

    #[test]
    fn starts_on_first_available_component() {
        let s = session();
        assert_eq!(s.component(), Component::Atm);
        assert!(s.selection().is_none());
        assert_eq!(s.eligible_cases(), vec![id("A"), id("B"), id("C")]);
    }

    #[test]
    fn select_rejects_ineligible_case() {
        let s = session();
        s.set_component(Component::Ocn).unwrap();
        let err = s.select(vec![id("A"), id("C")]).unwrap_err();
        assert!(matches!(err, SessionError::NotEligible { ref case, .. } if case.as_str() == "C"));
        assert!(s.selection().is_none());
    }

    #[test]
    fn select_rejects_bad_sizes() {
        let s = session();
        assert!(matches!(
            s.select(vec![id("A")]),
            Err(SessionError::Selection(_))
        ));
    }

    #[test]
    fn unavailable_component_rejected() {
        let s = session();
        assert!(matches!(
            s.set_component(Component::Ice),
            Err(SessionError::ComponentUnavailable(Component::Ice))
        ));
        assert_eq!(s.component(), Component::Atm);
    }

    #[test]
    fn component_switch_keeps_eligible_cases() {
        let s = session();
        s.select(vec![id("C"), id("B"), id("A")]).unwrap();
        s.set_component(Component::Ocn).unwrap();
        let sel = s.selection().unwrap();
        assert_eq!(sel.cases(), &[id("B"), id("A")]);
    }

    #[test]
    fn component_switch_clears_short_selection() {
        let s = session();
        s.select(vec![id("A"), id("C")]).unwrap();
        s.set_component(Component::Ocn).unwrap();
        assert!(s.selection().is_none());
    }

    #[test]
    fn changes_bump_generation() {
        let s = session();
        let g0 = s.generation();
        s.select(vec![id("A"), id("B")]).unwrap();
        let g1 = s.generation();
        assert!(g1 > g0);
        s.set_component(Component::Atm).unwrap();
        assert_eq!(s.generation(), g1);
        s.clear_selection();
        assert!(s.generation() > g1);
    }

    #[tokio::test]
    async fn refresh_without_selection() {
        let s = session();
        assert!(matches!(s.refresh().await, Refresh::NoSelection));
    }

    #[tokio::test]
    async fn refresh_in_selection_order() {
        let s = session();
        s.select(vec![id("B"), id("A")]).unwrap();
        let table = s.refresh().await.table().unwrap();
        assert_eq!(table.cases, vec![id("B"), id("A")]);
        let row = &table.sections[0].groups[0].rows[0];
        assert_eq!(row.cells[0].text(), "B");
        assert_eq!(row.cells[1].text(), "A");
        assert!(row.divergent);
    }

    #[tokio::test]
    async fn compare_sets_component_and_selection() {
        let s = session();
        let table = s.compare(Component::Ocn, vec![id("A"), id("B")]).await.unwrap();
        assert_eq!(table.component, Component::Ocn);
        assert_eq!(table.row_count(), 1);
        assert_eq!(s.component(), Component::Ocn);
    }
}
