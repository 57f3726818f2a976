//! The comparison result.
//!
//! A [`DiffTable`] is pure derived data: it is rebuilt whenever the selection,
//! the component or the documents change and is never edited in place.

use std::fmt;

use casediff_types::{CaseId, Component};
use serde::Serialize;

use crate::format::Cell;

/// Which configuration source a section compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// The grouped namelist of a standard component.
    Namelist,
    /// Ocean `MOM_override` parameters.
    Override,
    /// Ocean `MOM_input` parameters.
    Base,
    /// Ocean `input.nml` namelist.
    Nested,
}

impl SectionKind {
    /// Header shown above the section.
    pub fn title(self) -> &'static str {
        match self {
            Self::Namelist => "Namelist",
            Self::Override => "MOM_override",
            Self::Base => "MOM_input",
            Self::Nested => "input.nml",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One comparable key, with one cell per selected case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub key: String,
    /// Cells in selection order.
    pub cells: Vec<Cell>,
    /// `true` iff the cells are not all identical.
    pub divergent: bool,
    /// Ocean base rows only: the key is overridden in at least one selected
    /// case. A display hint; the cells still hold the base values.
    pub overridden: bool,
}

impl DiffRow {
    /// Build a row, deriving `divergent` from the cells.
    pub fn new(key: impl Into<String>, cells: Vec<Cell>, overridden: bool) -> Self {
        let divergent = cells.windows(2).any(|pair| pair[0] != pair[1]);
        Self {
            key: key.into(),
            cells,
            divergent,
            overridden,
        }
    }
}

/// Rows under one group header. Flat sections use a single unnamed group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffGroup {
    pub name: Option<String>,
    pub rows: Vec<DiffRow>,
}

impl DiffGroup {
    /// Returns `true` if any row in the group is divergent.
    pub fn has_divergence(&self) -> bool {
        self.rows.iter().any(|r| r.divergent)
    }
}

/// One configuration source's rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffSection {
    pub kind: SectionKind,
    pub groups: Vec<DiffGroup>,
}

impl DiffSection {
    /// Iterate every row in the section.
    pub fn rows(&self) -> impl Iterator<Item = &DiffRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }
}

/// Comparison of one component across the selected cases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffTable {
    pub component: Component,
    /// Column order of every row's cells.
    pub cases: Vec<CaseId>,
    pub sections: Vec<DiffSection>,
}

impl DiffTable {
    /// A table with no sections.
    pub fn empty(component: Component, cases: Vec<CaseId>) -> Self {
        Self {
            component,
            cases,
            sections: Vec::new(),
        }
    }

    /// Returns `true` if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The section of the given kind, if present.
    pub fn section(&self, kind: SectionKind) -> Option<&DiffSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Iterate every row in display order.
    pub fn rows(&self) -> impl Iterator<Item = &DiffRow> {
        self.sections.iter().flat_map(|s| s.rows())
    }

    /// Total number of rows.
    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    /// Number of divergent rows.
    pub fn divergent_count(&self) -> usize {
        self.rows().filter(|r| r.divergent).count()
    }

    /// Look up a row by section, group and key.
    pub fn find(&self, kind: SectionKind, group: Option<&str>, key: &str) -> Option<&DiffRow> {
        self.section(kind)?
            .groups
            .iter()
            .find(|g| g.name.as_deref() == group)?
            .rows
            .iter()
            .find(|r| r.key == key)
    }
}
