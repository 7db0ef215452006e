use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::{Layout, RefreshState, Source, SourceKind};

const ENV_PREFIX: &str = "PINDEX_";
const CONFIG_FILE: &str = "pindex.toml";
const DEFAULT_RECHECK_MINUTES: u32 = 24 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "PinCab", "pindex")
}

/// User configuration.
///
/// Merged from (lowest priority first) the built-in defaults, a TOML file,
/// and `PINDEX_`-prefixed environment variables.
///
/// ```toml
/// recheck_minutes = 720
///
/// [[sources]]
/// name = "Virtual Pinball Spreadsheet"
/// url = "https://raw.githubusercontent.com/owner/repo/main/vpsdb.json"
/// kind = "TableIndex"
/// access_token = "ghp_..."
///
/// [[sources]]
/// name = "IPDB"
/// url = "https://example.org/ipdbdatabase.json"
/// kind = "IdentityIndex"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Sources in registry order; refresh and rebuild passes follow this order.
    #[serde(default)]
    pub sources: Vec<Source>,
    pub recheck_minutes: u32,
    pub request_timeout_secs: u64,
    /// Overrides the platform application data folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            recheck_minutes: DEFAULT_RECHECK_MINUTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}
impl Settings {
    /// The configuration file used when none is given explicitly.
    pub fn default_config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Loads settings from `file` (or the default config file when `None`).
    ///
    /// A missing file is not an error; the defaults and environment still apply.
    #[instrument]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(Self::default_config_file);
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Merging configuration file");
            figment = figment.merge(Toml::file(file));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Config)
    }

    /// Resolves the data folder: the configured override, or the platform default.
    pub fn layout(&self) -> Result<Layout> {
        let root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => project_dirs().ok_or_raise(|| ErrorKind::NoDataDirectory)?.data_dir().to_path_buf(),
        };
        Ok(Layout::new(root))
    }

    /// Loads the persisted [`RefreshState`] for this configuration.
    pub fn refresh_state(&self, layout: &Layout) -> Result<RefreshState> {
        RefreshState::load(layout.state_path(), self.recheck_minutes)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The first configured identity source.
    pub fn identity_source(&self) -> Option<&Source> {
        self.sources.iter().find(|source| source.kind == SourceKind::IdentityIndex)
    }
}
