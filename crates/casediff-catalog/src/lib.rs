//! Case catalog for casediff.
//!
//! The collector publishes one catalog document listing, for every case, where
//! the parsed configuration of each component lives. Most cases only carry
//! some components, so absence is the normal state rather than an error.
//!
//! # Key Types
//!
//! - [`Catalog`] — case id → per-component [`Locator`] (BTreeMap-backed)
//! - [`Availability`] — number of cases with data, per component

pub mod catalog;
pub mod error;

pub use catalog::{Availability, Catalog, Locator};
pub use error::{CatalogError, CatalogResult};
