//! Foundation types for casediff.
//!
//! This crate provides the configuration document model shared by every other
//! casediff crate: which model component a document belongs to, which cases
//! are being compared, and the typed values parsed out of namelists.
//!
//! # Key Types
//!
//! - [`Component`] — One of the four simulated domains (`atm`, `lnd`, `ice`, `ocn`)
//! - [`CaseId`] / [`CaseSelection`] — Case identifiers and a bounded 2–4 case selection
//! - [`Value`] — Closed sum type for namelist values
//! - [`ConfigDocument`] — Standard (group → key → value) or ocean composite document

pub mod case;
pub mod component;
pub mod document;
pub mod error;
pub mod value;

pub use case::{CaseId, CaseSelection};
pub use component::Component;
pub use document::{ConfigDocument, Group, OceanDocument, ParamMap, StandardDocument};
pub use error::{SelectionError, TypeError};
pub use value::Value;
