//! N-way comparison of configuration documents.
//!
//! Every group and key present in any selected document appears exactly once
//! in the output, in byte-wise lexicographic order, with one cell per case in
//! selection order. Ordering depends only on names, never on which document
//! arrived first.

use std::collections::{BTreeMap, BTreeSet};

use casediff_types::{
    CaseId, CaseSelection, Component, ConfigDocument, OceanDocument, ParamMap, StandardDocument,
    Value,
};
use tracing::debug;

use crate::format::Cell;
use crate::table::{DiffGroup, DiffRow, DiffSection, DiffTable, SectionKind};

/// Compare one component's documents across cases.
///
/// `documents[i]` belongs to `cases[i]`; `None` (or a missing trailing entry)
/// means the case has no usable document and renders as missing in every
/// row. Fewer than two cases yield an empty table.
///
/// A document of the wrong form for `component` is treated as absent.
pub fn compute_diff(
    component: Component,
    cases: &[CaseId],
    documents: &[Option<&ConfigDocument>],
) -> DiffTable {
    let mut table = DiffTable::empty(component, cases.to_vec());
    if cases.len() < CaseSelection::MIN {
        debug!(%component, cases = cases.len(), "too few cases to compare");
        return table;
    }

    let aligned: Vec<Option<&ConfigDocument>> = (0..cases.len())
        .map(|i| documents.get(i).copied().flatten())
        .collect();

    table.sections = if component.is_composite() {
        let oceans: Vec<Option<&OceanDocument>> = aligned
            .iter()
            .map(|d| d.and_then(ConfigDocument::as_ocean))
            .collect();
        diff_ocean(&oceans)
    } else {
        let standards: Vec<Option<&StandardDocument>> = aligned
            .iter()
            .map(|d| d.and_then(ConfigDocument::as_standard))
            .collect();
        let groups = diff_groups(&standards);
        if groups.is_empty() {
            Vec::new()
        } else {
            vec![DiffSection {
                kind: SectionKind::Namelist,
                groups,
            }]
        }
    };

    debug!(
        %component,
        cases = cases.len(),
        rows = table.row_count(),
        divergent = table.divergent_count(),
        "diff computed"
    );
    table
}

/// [`compute_diff`] for a validated selection.
pub fn compute_selection_diff(
    component: Component,
    selection: &CaseSelection,
    documents: &[Option<&ConfigDocument>],
) -> DiffTable {
    compute_diff(component, selection.cases(), documents)
}

fn build_row<'v>(
    key: &str,
    values: impl Iterator<Item = Option<&'v Value>>,
    overridden: bool,
) -> DiffRow {
    DiffRow::new(key, values.map(Cell::from_value).collect(), overridden)
}

/// Union of groups, then union of keys within each group.
fn diff_groups(docs: &[Option<&StandardDocument>]) -> Vec<DiffGroup> {
    let mut layout: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for doc in docs.iter().flatten() {
        for (group, entries) in &doc.groups {
            layout
                .entry(group.as_str())
                .or_default()
                .extend(entries.keys().map(String::as_str));
        }
    }

    layout
        .into_iter()
        .map(|(group, keys)| DiffGroup {
            name: Some(group.to_string()),
            rows: keys
                .into_iter()
                .map(|key| {
                    let values = docs.iter().map(|d| d.and_then(|d| d.get(group, key)));
                    build_row(key, values, false)
                })
                .collect(),
        })
        .collect()
}

/// Union of keys across flat parameter maps. Rows whose key is in
/// `overridden_keys` carry the override hint.
fn diff_flat(maps: &[Option<&ParamMap>], overridden_keys: &BTreeSet<&str>) -> Vec<DiffRow> {
    let keys: BTreeSet<&str> = maps
        .iter()
        .flatten()
        .flat_map(|m| m.keys().map(String::as_str))
        .collect();

    keys.into_iter()
        .map(|key| {
            let values = maps.iter().map(|m| m.and_then(|m| m.get(key)));
            build_row(key, values, overridden_keys.contains(key))
        })
        .collect()
}

/// Override, Base and Nested sections, each only if some case has data for it.
fn diff_ocean(docs: &[Option<&OceanDocument>]) -> Vec<DiffSection> {
    let overrides: Vec<Option<&ParamMap>> = docs.iter().map(|d| d.map(|d| &d.overrides)).collect();
    let bases: Vec<Option<&ParamMap>> = docs.iter().map(|d| d.map(|d| &d.base)).collect();
    let nested: Vec<Option<&StandardDocument>> = docs.iter().map(|d| d.map(|d| &d.nested)).collect();

    // Union across all cases: a key overridden anywhere in the comparison set
    // flags its base row for every case.
    let overridden_keys: BTreeSet<&str> = overrides
        .iter()
        .flatten()
        .flat_map(|m| m.keys().map(String::as_str))
        .collect();

    let mut sections = Vec::with_capacity(3);
    if overrides.iter().flatten().any(|m| !m.is_empty()) {
        sections.push(DiffSection {
            kind: SectionKind::Override,
            groups: vec![DiffGroup {
                name: None,
                rows: diff_flat(&overrides, &BTreeSet::new()),
            }],
        });
    }
    if bases.iter().flatten().any(|m| !m.is_empty()) {
        sections.push(DiffSection {
            kind: SectionKind::Base,
            groups: vec![DiffGroup {
                name: None,
                rows: diff_flat(&bases, &overridden_keys),
            }],
        });
    }
    if nested.iter().flatten().any(|n| !n.groups.is_empty()) {
        sections.push(DiffSection {
            kind: SectionKind::Nested,
            groups: diff_groups(&nested),
        });
    }
    sections
}
