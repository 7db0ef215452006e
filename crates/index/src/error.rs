//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an index failure.
///
/// Fetch failures never show up here: a refresh pass reports them as
/// messages instead of failing.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings could not be resolved into a usable layout or state.
    #[display("invalid configuration")]
    Config,
    /// The HTTP fetcher could not be constructed.
    #[display("could not create fetcher")]
    Fetcher,
    /// Reading or writing a file failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// A downloaded database or the index cache could not be parsed.
    #[display("corrupt document: {}", _0.display())]
    Corrupt(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
