use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, TypeError};

/// Identifier of a simulation case (e.g. `b.e30_alpha06b.B1850C_LTso.ne30_t232_wgx3.146`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    /// Create a case id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyCaseId);
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An ordered set of 2–4 distinct cases chosen for side-by-side comparison.
///
/// The upper bound keeps the rendered grid readable; it is enforced here so
/// an oversized selection never reaches the diff engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseSelection {
    cases: Vec<CaseId>,
}

impl CaseSelection {
    /// Minimum number of cases in a comparison.
    pub const MIN: usize = 2;
    /// Maximum number of cases in a comparison.
    pub const MAX: usize = 4;

    /// Build a selection, preserving the caller's order.
    pub fn new(cases: Vec<CaseId>) -> Result<Self, SelectionError> {
        if cases.len() < Self::MIN {
            return Err(SelectionError::TooFew(cases.len()));
        }
        if cases.len() > Self::MAX {
            return Err(SelectionError::TooMany(cases.len()));
        }
        for (i, case) in cases.iter().enumerate() {
            if cases[..i].contains(case) {
                return Err(SelectionError::Duplicate(case.to_string()));
            }
        }
        Ok(Self { cases })
    }

    /// The selected cases in column order.
    pub fn cases(&self) -> &[CaseId] {
        &self.cases
    }

    /// Number of selected cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always `false`; a valid selection holds at least [`Self::MIN`] cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Returns `true` if the case is part of the selection.
    pub fn contains(&self, case: &CaseId) -> bool {
        self.cases.contains(case)
    }
}

impl<'a> IntoIterator for &'a CaseSelection {
    type Item = &'a CaseId;
    type IntoIter = std::slice::Iter<'a, CaseId>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
