//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The merged configuration could not be extracted into [`Settings`](crate::Settings).
    #[display("invalid configuration")]
    Config,
    /// No home directory could be determined to derive the default folders from.
    #[display("could not determine the application data directory")]
    NoDataDirectory,
    /// Reading or writing a file failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Persisted data could not be (de)serialized.
    #[display("invalid data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// Path contains invalid characters or escapes its root.
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Config.to_string(), "invalid configuration");
        assert_eq!(ErrorKind::InvalidData("refresh state").to_string(), "invalid data: refresh state");
        assert_eq!(ErrorKind::InvalidPath(PathBuf::from("../x")).to_string(), "invalid path: ../x");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io(PathBuf::from("state.json")).is_retryable());
        assert!(!ErrorKind::Config.is_retryable());
        assert!(!ErrorKind::InvalidData("settings").is_retryable());
    }
}
