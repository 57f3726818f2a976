//! Parsers for the configuration files collected per case.
//!
//! The collector reads these from a case's `CaseDocs/` and run directories
//! and stores the result in the per-case JSON documents consumed by the
//! comparison engine.
//!
//! - [`parse_namelist`] — Fortran namelists (`atm_in`, `lnd_in`, `ice_in`, `input.nml`)
//! - [`parse_mom_params`] — MOM parameter files (`MOM_input`, `MOM_override`)
//! - [`parse_scalar`] / [`parse_values`] — the shared literal grammar

pub mod error;
pub mod mom;
pub mod namelist;
pub mod scalar;

pub use error::{NamelistError, NamelistResult};
pub use mom::parse_mom_params;
pub use namelist::{parse_namelist, MAX_SUBSCRIPT};
pub use scalar::{parse_scalar, parse_values};
