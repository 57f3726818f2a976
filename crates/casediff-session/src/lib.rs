//! Comparison session for casediff.
//!
//! A [`CompareSession`] owns the document cache and the selector state (the
//! active component and the selected cases). Refreshing fans out one fetch
//! per selected case, waits for all of them, checks that the selection is
//! still the one it started with, and hands the documents to the diff engine.
//!
//! ```text
//! select / set_component ──► generation += 1
//! refresh ──► snapshot(generation) ──► JoinSet fetches ──► join
//!         ──► generation unchanged? ──► compute_diff ──► Refresh::Table
//!                          └── changed ──► Refresh::Superseded
//! ```

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{CompareSession, Refresh};
