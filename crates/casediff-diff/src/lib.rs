//! Diff engine for casediff.
//!
//! Compares the configuration documents of 2–4 cases for one component and
//! produces a unified, deterministically ordered table of rows, each marked
//! identical or divergent across the cases.
//!
//! # Key Types
//!
//! - [`compute_diff`] -- Pure N-way comparison, standard or ocean composite
//! - [`DiffTable`] / [`DiffSection`] / [`DiffGroup`] / [`DiffRow`] -- The comparison result
//! - [`Cell`] / [`format_value`] -- Per-case formatted values and the missing token
//! - [`Grid`] -- Display-ready projection of a table, with per-cell highlighting

pub mod engine;
pub mod format;
pub mod grid;
pub mod table;

pub use engine::{compute_diff, compute_selection_diff};
pub use format::{format_value, Cell, MISSING_MARKER};
pub use grid::{Grid, GridCell, GridEntry, GridOptions, GridRow, GridSummary, OVERRIDDEN_NOTE};
pub use table::{DiffGroup, DiffRow, DiffSection, DiffTable, SectionKind};
