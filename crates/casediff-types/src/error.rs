use thiserror::Error;

use crate::case::CaseSelection;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown component tag: {0:?} (expected one of atm, lnd, ice, ocn)")]
    UnknownComponent(String),

    #[error("case id must not be empty")]
    EmptyCaseId,
}

/// Errors produced when building a [`CaseSelection`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error(
        "at least {min} cases are required for a comparison, got {0}",
        min = CaseSelection::MIN
    )]
    TooFew(usize),

    #[error(
        "at most {max} cases can be compared at once, got {0}",
        max = CaseSelection::MAX
    )]
    TooMany(usize),

    #[error("case {0:?} selected more than once")]
    Duplicate(String),
}
