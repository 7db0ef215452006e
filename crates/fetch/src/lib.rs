//! Fetching of remote source databases.
//!
//! A [`Fetcher`] downloads one [`Source`] into a destination file. The file is
//! only replaced once the whole body has arrived, so a failed download never
//! clobbers the previous copy.

pub mod error;
mod file;
mod http;
#[cfg(feature = "mock")]
mod mock;

use crate::error::Result;
pub use crate::file::write_atomically;
pub use crate::http::{HttpFetcher, USER_AGENT};
#[cfg(feature = "mock")]
pub use crate::mock::MockFetcher;
use pindex_config::Source;
use std::path::Path;
use std::sync::Arc;

/// Unified interface for downloading source databases.
pub trait Fetcher {
    /// A short identifier used in log output.
    fn name(&self) -> &str;

    /// Downloads `source` to `destination`, returning the number of bytes written.
    ///
    /// On error the destination is left exactly as it was.
    fn fetch(&self, source: &Source, destination: &Path) -> Result<u64>;
}

pub type FetcherHandle = Arc<dyn Fetcher + Send + Sync>;
