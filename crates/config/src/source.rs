use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use url::Url;

use crate::path::validate_file_name;

/// Hosts that get the access token attached as a bearer credential.
const CODE_HOSTING_MARKER: &str = "github";

/// The kind of document a [`Source`] publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// A database of tables (and table variants) with free-form tags.
    #[serde(alias = "PinballDatabase")]
    TableIndex,
    /// The authoritative machine-identity database, keyed by identity number.
    #[serde(alias = "IPDB", alias = "Ipdb")]
    IdentityIndex,
}
impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::TableIndex => "TableIndex",
            SourceKind::IdentityIndex => "IdentityIndex",
        }
    }
}
impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A configured remote content provider.
///
/// A source is only usable when its URL parses and ends in a plain file
/// name (see [`Source::file_name`]). Invalid sources are skipped by every
/// operation rather than failing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub kind: SourceKind,
    /// Credential for private repositories on code-hosting providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}
impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn parsed_url(&self) -> Option<Url> {
        let url = self.url.trim();
        if url.is_empty() {
            return None;
        }
        Url::parse(url).ok()
    }

    /// The local file name for this source: the last path segment of its URL.
    ///
    /// Returns `None` for an empty or unparseable URL, and for URLs whose
    /// last segment is not a safe file name (e.g. a trailing slash).
    pub fn file_name(&self) -> Option<String> {
        let url = self.parsed_url()?;
        let segment = url.path_segments()?.next_back()?.to_string();
        validate_file_name(segment).ok()
    }

    /// Whether the URL names a file that can be downloaded.
    pub fn is_valid(&self) -> bool {
        self.file_name().is_some()
    }

    /// The token to send as a bearer credential, if any.
    ///
    /// Only sources hosted on a code-hosting provider get the credential, so
    /// a token configured for one host never leaks to an arbitrary mirror.
    pub fn bearer_token(&self) -> Option<&str> {
        let token = self.access_token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let url = self.parsed_url()?;
        url.host_str()
            .is_some_and(|host| host.to_ascii_lowercase().contains(CODE_HOSTING_MARKER))
            .then_some(token)
    }
}
