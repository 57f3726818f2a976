//! Display-ready projection of a [`DiffTable`].
//!
//! The grid flattens sections and groups into header and entry rows and
//! attaches per-cell text and highlight flags, so a renderer only has to lay
//! things out.

use serde::Serialize;

use crate::table::{DiffRow, DiffTable, SectionKind};

/// Hint shown next to ocean base rows whose key is overridden.
pub const OVERRIDDEN_NOTE: &str = "↑ Overridden";

/// Options controlling the projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridOptions {
    /// Keep only divergent rows, dropping headers left without entries.
    pub only_divergent: bool,
}

/// One rendered cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub text: String,
    pub missing: bool,
    /// Highlight this cell.
    pub differs: bool,
}

/// A key row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridEntry {
    pub key: String,
    pub cells: Vec<GridCell>,
    pub divergent: bool,
    pub note: Option<&'static str>,
}

/// One line of the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridRow {
    Section { title: &'static str },
    Group { name: String },
    Entry(GridEntry),
}

/// Row counts for the summary line above the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GridSummary {
    pub rows: usize,
    pub divergent: usize,
    pub overridden: usize,
}

/// The full projection: column headers plus rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Grid {
    /// Case ids, one per value column.
    pub headers: Vec<String>,
    pub rows: Vec<GridRow>,
    /// Counts over the whole table, before filtering.
    pub summary: GridSummary,
}

impl Grid {
    /// Project a table. Standard components get group headers only; ocean
    /// sections get a section header each.
    pub fn from_table(table: &DiffTable, options: GridOptions) -> Self {
        let keep = |row: &DiffRow| !options.only_divergent || row.divergent;
        let mut rows = Vec::new();

        for section in &table.sections {
            let kept_in_section = section.rows().filter(|r| keep(r)).count();
            if kept_in_section == 0 && options.only_divergent {
                continue;
            }
            if section.kind != SectionKind::Namelist {
                rows.push(GridRow::Section {
                    title: section.kind.title(),
                });
            }
            for group in &section.groups {
                let kept: Vec<&DiffRow> = group.rows.iter().filter(|r| keep(r)).collect();
                if kept.is_empty() && options.only_divergent {
                    continue;
                }
                if let Some(name) = &group.name {
                    rows.push(GridRow::Group { name: name.clone() });
                }
                rows.extend(kept.into_iter().map(|r| GridRow::Entry(entry(r))));
            }
        }

        let summary = GridSummary {
            rows: table.row_count(),
            divergent: table.divergent_count(),
            overridden: table.rows().filter(|r| r.overridden).count(),
        };

        Self {
            headers: table.cases.iter().map(ToString::to_string).collect(),
            rows,
            summary,
        }
    }

    /// Key rows only.
    pub fn entries(&self) -> impl Iterator<Item = &GridEntry> {
        self.rows.iter().filter_map(|r| match r {
            GridRow::Entry(e) => Some(e),
            _ => None,
        })
    }

    /// Character width of the key column followed by each value column.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = std::iter::once("key".len())
            .chain(self.headers.iter().map(|h| h.chars().count()))
            .collect();
        for e in self.entries() {
            widths[0] = widths[0].max(e.key.chars().count());
            for (i, cell) in e.cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i + 1) {
                    *w = (*w).max(cell.text.chars().count());
                }
            }
        }
        widths
    }

    /// One padded text line for a key row. Divergent rows are marked `*`.
    pub fn format_entry(entry: &GridEntry, widths: &[usize]) -> String {
        let marker = if entry.divergent { '*' } else { ' ' };
        let mut line = format!("{marker} {}", pad(&entry.key, widths[0]));
        for (i, cell) in entry.cells.iter().enumerate() {
            line.push_str(" | ");
            line.push_str(&pad(&cell.text, widths.get(i + 1).copied().unwrap_or(0)));
        }
        if let Some(note) = entry.note {
            line.push_str("  ");
            line.push_str(note);
        }
        line.trim_end().to_string()
    }

    /// The column header line: `key` followed by the case ids.
    pub fn header_line(&self, widths: &[usize]) -> String {
        let mut header = format!("  {}", pad("key", widths[0]));
        for (i, h) in self.headers.iter().enumerate() {
            header.push_str(" | ");
            header.push_str(&pad(h, widths.get(i + 1).copied().unwrap_or(0)));
        }
        header.trim_end().to_string()
    }

    /// Dashes spanning the header line.
    pub fn rule_line(&self, widths: &[usize]) -> String {
        "-".repeat(widths.iter().sum::<usize>() + 3 * self.headers.len() + 2)
    }

    /// Text of one grid row, without styling.
    pub fn format_row(row: &GridRow, widths: &[usize]) -> String {
        match row {
            GridRow::Section { title } => format!("== {title} =="),
            GridRow::Group { name } => format!("&{name}"),
            GridRow::Entry(e) => Self::format_entry(e, widths),
        }
    }

    /// Render as plain text.
    pub fn render_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        for line in [self.header_line(&widths), self.rule_line(&widths)]
            .into_iter()
            .chain(self.rows.iter().map(|row| Self::format_row(row, &widths)))
        {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn entry(row: &DiffRow) -> GridEntry {
    GridEntry {
        key: row.key.clone(),
        cells: row
            .cells
            .iter()
            .map(|cell| GridCell {
                text: cell.text().to_string(),
                missing: cell.is_missing(),
                differs: row.divergent,
            })
            .collect(),
        divergent: row.divergent,
        note: row.overridden.then_some(OVERRIDDEN_NOTE),
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}
