//! Error types for the namelist parsers.

/// Errors produced while parsing namelist or parameter file text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NamelistError {
    /// A `&group` was opened but never closed with `/` or `&end`.
    #[error("group &{name} opened on line {line} is never terminated")]
    UnterminatedGroup { name: String, line: usize },

    /// Text that should be a `key = value` assignment is not one.
    #[error("line {line}: expected `key = value`, found {text:?}")]
    InvalidAssignment { line: usize, text: String },

    /// An array subscript is beyond [`crate::namelist::MAX_SUBSCRIPT`].
    #[error("line {line}: subscript {key}({index}) is out of range")]
    SubscriptOutOfRange {
        key: String,
        index: usize,
        line: usize,
    },

    /// A `%BLOCK` closing marker does not match the open block.
    #[error("line {line}: block %{name} closed but not open")]
    UnbalancedBlock { name: String, line: usize },

    /// A `BLOCK%` parameter block is still open at end of file.
    #[error("parameter block {name}% is never closed")]
    UnterminatedBlock { name: String },
}

/// Convenience alias for parser results.
pub type NamelistResult<T> = Result<T, NamelistError>;
