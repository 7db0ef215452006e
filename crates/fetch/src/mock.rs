//! In-memory fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::{Fetcher, write_atomically};
use exn::ResultExt;
use pindex_config::Source;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

enum Response {
    Body(Vec<u8>),
    Fail,
}

/// Serves canned bodies by URL and records every URL it was asked for.
///
/// URLs with no canned response answer `404`. Responses can be swapped
/// between calls, so a test can publish a new version of a database.
///
/// ```
/// use pindex_fetch::{Fetcher, MockFetcher};
///
/// let fetcher = MockFetcher::with_responses([("https://example.com/a.json", "{}")]);
/// assert!(fetcher.requests().is_empty());
/// ```
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<String>>,
}
impl MockFetcher {
    pub fn with_responses(responses: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let responses = responses.into_iter().map(|(url, body)| (url.into(), Response::Body(body.into()))).collect();
        Self { responses: Mutex::new(responses), requests: Mutex::default() }
    }

    /// Serve `body` for `url` from now on.
    pub fn respond(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        lock(&self.responses).insert(url.into(), Response::Body(body.into()));
    }

    /// Fail every request for `url` with a network error from now on.
    pub fn fail(&self, url: impl Into<String>) {
        lock(&self.responses).insert(url.into(), Response::Fail);
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, source: &Source, destination: &Path) -> Result<u64> {
        let url = source.url.trim().to_string();
        lock(&self.requests).push(url.clone());
        let body = match lock(&self.responses).get(&url) {
            Some(Response::Body(body)) => body.clone(),
            Some(Response::Fail) => exn::bail!(ErrorKind::Network(url)),
            None => exn::bail!(ErrorKind::Status { status: 404, url }),
        };
        write_atomically(destination, |file| {
            file.write_all(&body).or_raise(|| ErrorKind::Io(destination.to_path_buf()))?;
            Ok(body.len() as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindex_config::SourceKind;
    use tempfile::TempDir;

    fn source(url: &str) -> Source {
        Source::new("Test", url, SourceKind::TableIndex)
    }

    #[test]
    fn test_serves_and_records() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("a.json");
        let fetcher = MockFetcher::with_responses([("http://x/a.json", "{}")]);
        assert_eq!(fetcher.fetch(&source("http://x/a.json"), &destination).unwrap(), 2);
        assert!(fetcher.fetch(&source("http://x/b.json"), &destination).is_err());
        assert_eq!(fetcher.requests(), ["http://x/a.json", "http://x/b.json"]);
        assert_eq!(std::fs::read(&destination).unwrap(), b"{}");
    }

    #[test]
    fn test_failure_is_retryable() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::default();
        fetcher.fail("http://x/a.json");
        let error = fetcher.fetch(&source("http://x/a.json"), &dir.path().join("a.json")).unwrap_err();
        assert!(error.is_retryable());
        assert!(!dir.path().join("a.json").exists());
    }
}
