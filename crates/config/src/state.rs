//! Persisted refresh bookkeeping.

use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::EPOCH;
use crate::error::{ErrorKind, Result};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StateFile {
    #[serde(with = "time::serde::rfc3339")]
    last_refresh_utc: OffsetDateTime,
    recheck_minutes: u32,
}

/// The single, global "when did we last download anything" timestamp.
///
/// One timestamp is shared by every source: once the interval elapses every
/// source is due in the same pass. Mutated only through [`record_refresh`](Self::record_refresh), which
/// persists immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshState {
    path: PathBuf,
    last_refresh_utc: OffsetDateTime,
    recheck_minutes: u32,
}
impl RefreshState {
    /// A fresh state that has never refreshed (always due).
    pub fn new(path: impl Into<PathBuf>, recheck_minutes: u32) -> Self {
        Self {
            path: path.into(),
            last_refresh_utc: EPOCH,
            recheck_minutes,
        }
    }

    /// Loads the state from `path`, applying the currently configured interval.
    ///
    /// A missing file yields a never-refreshed state. A file that cannot be
    /// parsed is logged and treated the same way: the worst outcome is one
    /// extra download pass.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, recheck_minutes: u32) -> Result<Self> {
        let path = path.as_ref();
        let mut state = Self::new(path, recheck_minutes);
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(state),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io(path.to_path_buf())),
        };
        match serde_json::from_str::<StateFile>(&contents) {
            Ok(file) => state.last_refresh_utc = file.last_refresh_utc,
            Err(e) => tracing::warn!(error = %e, "Unreadable refresh state; starting over"),
        }
        Ok(state)
    }

    pub fn save(&self) -> Result<()> {
        let file = StateFile {
            last_refresh_utc: self.last_refresh_utc,
            recheck_minutes: self.recheck_minutes,
        };
        let json = serde_json::to_string_pretty(&file).or_raise(|| ErrorKind::InvalidData("refresh state"))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
        }
        fs::write(&self.path, json).or_raise(|| ErrorKind::Io(self.path.clone()))
    }

    pub fn last_refresh(&self) -> OffsetDateTime {
        self.last_refresh_utc
    }

    pub fn recheck_minutes(&self) -> u32 {
        self.recheck_minutes
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.recheck_minutes))
    }

    pub fn next_refresh(&self) -> OffsetDateTime {
        self.last_refresh_utc.saturating_add(self.interval())
    }

    /// Whether the recheck interval has elapsed at `now`.
    pub fn is_due(&self, now: OffsetDateTime) -> bool {
        now - self.last_refresh_utc >= self.interval()
    }

    /// Records a pass that downloaded at least one source, and persists it.
    pub fn record_refresh(&mut self, now: OffsetDateTime) -> Result<()> {
        self.last_refresh_utc = now;
        self.save()
    }
}
