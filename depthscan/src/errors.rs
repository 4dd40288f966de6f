//! Error types for depthscan.
//!
//! Only a handful of variants ever reach the caller: a bad root, an empty
//! pattern list, a pattern the regex engine refuses, and configuration
//! problems. Enumeration and read failures are built as values too, but the
//! search engine downgrades them to warnings and keeps going, so one locked
//! file or unreadable directory never voids a large-tree search.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search root: {0}")]
    InvalidRoot(PathBuf),
    #[error("Empty pattern: {0}")]
    EmptyPattern(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Failed to enumerate {path}: {source}")]
    EnumerationFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_root(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot(path.into())
    }

    pub fn empty_pattern(what: impl Into<String>) -> Self {
        Self::EmptyPattern(what.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn enumeration_failure(path: &Path, source: std::io::Error) -> Self {
        Self::EnumerationFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn read_failure(path: &Path, source: std::io::Error) -> Self {
        Self::ReadFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the search can continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EnumerationFailure { .. } | Self::ReadFailure { .. }
        )
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
