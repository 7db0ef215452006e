//! HTTP fetcher backed by a blocking `reqwest` client.

use crate::error::{ErrorKind, Result};
use crate::{Fetcher, write_atomically};
use exn::ResultExt;
use pindex_config::Source;
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

pub const USER_AGENT: &str = concat!("pindex/", env!("CARGO_PKG_VERSION"));

/// Downloads sources over HTTP(S).
///
/// Sources hosted on GitHub that carry an access token are requested with a
/// bearer `Authorization` header; everything else is fetched anonymously.
///
/// ```no_run
/// use pindex_fetch::{Fetcher, HttpFetcher};
/// use pindex_config::{Source, SourceKind};
/// use std::path::Path;
/// use std::time::Duration;
///
/// let fetcher = HttpFetcher::new(Duration::from_secs(60)).unwrap();
/// let source = Source::new("IPDB", "https://example.com/ipdbdatabase.json", SourceKind::IdentityIndex);
/// fetcher.fetch(&source, Path::new("/tmp/Databases/ipdbdatabase.json")).unwrap();
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}
impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(timeout).build().or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }
}
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, source), fields(source = %source.name, url = %source.url))]
    fn fetch(&self, source: &Source, destination: &Path) -> Result<u64> {
        let url = source.url.trim();
        let mut request = self.client.get(url);
        if let Some(token) = source.bearer_token() {
            debug!("Sending access token");
            request = request.bearer_auth(token);
        }
        let mut response = request.send().or_raise(|| ErrorKind::Network(url.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { status: status.as_u16(), url: url.to_string() });
        }
        let written = write_atomically(destination, |file| {
            response.copy_to(file).or_raise(|| ErrorKind::Network(url.to_string()))
        })?;
        debug!(bytes = written, "Download complete");
        Ok(written)
    }
}
