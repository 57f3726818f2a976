use casediff_catalog::CatalogError;
use casediff_types::{CaseId, Component, SelectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid selection: {0}")]
    Selection(#[from] SelectionError),

    #[error("case {case} has no {component} document")]
    NotEligible { case: CaseId, component: Component },

    #[error("no case has data for component {0}")]
    ComponentUnavailable(Component),

    #[error("selection changed while the comparison was loading")]
    Superseded,

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type SessionResult<T> = Result<T, SessionError>;
