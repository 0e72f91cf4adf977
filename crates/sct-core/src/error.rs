//! Unified error types for the SCT ecosystem
//!
//! This module provides a common error type [`SctError`] that can represent
//! errors from any part of the system. Domain-specific error types can be
//! converted to `SctError` for uniform error handling at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use sct_core::{SctError, SctResult};
//!
//! fn price_workspace(path: &str) -> SctResult<()> {
//!     let space = load_data_space(path)?;
//!     run_fiber_model(&space)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all SCT operations.
///
/// This enum provides a common error representation for the SCT ecosystem,
/// allowing errors from I/O, parsing, graph manipulation, and validation to
/// be handled uniformly.
#[derive(Error, Debug)]
pub enum SctError {
    /// I/O errors (file access, workspace storage, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection model errors
    #[error("Connect error: {0}")]
    Connect(String),

    /// Cost graph structure errors
    #[error("Graph error: {0}")]
    Graph(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SctError.
pub type SctResult<T> = Result<T, SctError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for SctError {
    fn from(err: anyhow::Error) -> Self {
        SctError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for SctError {
    fn from(s: String) -> Self {
        SctError::Other(s)
    }
}

impl From<&str> for SctError {
    fn from(s: &str) -> Self {
        SctError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SctError::Graph("node 'x' is not a leaf".into());
        assert!(err.to_string().contains("Graph error"));
        assert!(err.to_string().contains("not a leaf"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sct_err: SctError = io_err.into();
        assert!(matches!(sct_err, SctError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SctResult<()> {
            Err(SctError::Validation("test".into()))
        }

        fn outer() -> SctResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
