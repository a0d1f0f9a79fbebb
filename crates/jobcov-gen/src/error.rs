//! Error types for jobcov-gen

use thiserror::Error;

/// Result type alias for jobcov-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a job matrix
#[derive(Debug, Error)]
pub enum Error {
    /// The parameter matrix violates one of its structural invariants
    #[error("Malformed matrix: field '{field}': {reason}")]
    MalformedMatrix {
        /// Offending field identifier (may be empty for unnamed fields)
        field: String,
        /// Violated invariant
        reason: String,
    },

    /// Every complete combination of a non-empty matrix is rejected by the filter chain
    #[error(
        "Unsatisfiable matrix: no admissible combination of {field_count} field(s){}",
        blocking_field.as_ref().map(|f| format!(", field '{f}' has no admissible value")).unwrap_or_default()
    )]
    Unsatisfiable {
        /// Number of fields in the matrix
        field_count: usize,
        /// First field whose every value is rejected on its own, if any
        blocking_field: Option<String>,
    },

    /// Tuple size must be at least one
    #[error("Invalid pair size: {0} (must be >= 1)")]
    InvalidPairSize(usize),

    /// Field identifier does not exist in the matrix
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A job value is not one of the field's candidate values
    #[error("Unknown value for field '{field}': {value}")]
    UnknownValue {
        /// Field identifier
        field: String,
        /// Rendered value
        value: String,
    },

    /// Job search needs at least one assignment
    #[error("Empty job search")]
    EmptySearch,

    /// Job name pattern failed to compile
    #[error("Invalid job name pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedMatrix {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
