//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only conditions that make a whole operation meaningless end up here.
/// Problems with a single file are recorded on the scan result instead, and
/// git failures degrade to an empty scope.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The repository root does not exist.
    #[error("Repository path does not exist: {0}")]
    NotFound(PathBuf),

    /// Represents a path that was expected to be a directory but was not.
    #[error("Repository path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A scan option is out of range (e.g. a zero size limit).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// A git query that the caller required to succeed did not.
    #[error("Git error: {0}")]
    Git(String),
}
