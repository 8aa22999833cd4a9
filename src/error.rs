//! Error types for coverage generation

use thiserror::Error;

/// Result type for coverage operations
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Errors that can occur while building the coverage report
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Target string does not split into exactly a name and a backend
    #[error("malformed test target '{target}': expected exactly one '{marker}'")]
    MalformedTarget {
        /// Raw target after prefix stripping
        target: String,
        /// Delimiter that was searched for
        marker: String,
    },

    /// Backend suffix is not in the registry
    #[error("test target '{target}' names unknown backend '{backend}'")]
    UnknownBackend {
        /// Raw target after prefix stripping
        target: String,
        /// Backend suffix that was not found
        backend: String,
    },

    /// External build query failed
    #[error("build query `{command}` failed: {message}")]
    Query { command: String, message: String },

    /// Embedded configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
