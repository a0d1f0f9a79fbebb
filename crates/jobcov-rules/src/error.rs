//! Error types for jobcov-rules

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the rule layer
#[derive(Debug, Error)]
pub enum Error {
    /// A version string could not be parsed
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// The rejected input
        version: String,
        /// What is wrong with it
        reason: String,
    },

    /// Comparison operator is not one of `==`, `!=`, `<`, `<=`, `>`, `>=`
    #[error("Invalid operator '{0}' (expected one of ==, !=, <, <=, >, >=)")]
    InvalidOperator(String),

    /// Software name has no entry in the supported-version table
    #[error("Unknown software name: {0}")]
    UnknownSoftware(String),

    /// A `name@version` argument is malformed or names unknown software
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// The rejected argument
        argument: String,
        /// What is wrong with it
        reason: String,
    },

    /// Building a combination for validation failed
    #[error("Matrix error: {0}")]
    Matrix(#[from] jobcov_gen::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidVersion {
            version: "x.y".to_string(),
            reason: "no numeric release".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid version 'x.y': no numeric release");
        assert!(Error::InvalidOperator("=>".to_string()).to_string().contains("'=>'"));
        assert_eq!(
            Error::UnknownSoftware("msvc".to_string()).to_string(),
            "Unknown software name: msvc"
        );
    }
}
