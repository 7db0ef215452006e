//! The preprocessed unified index, persisted as pretty JSON.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use pindex_config::Source;
use pindex_models::UnifiedEntry;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// The on-disk snapshot of every unified entry.
///
/// When present it is the source of truth: loading it never touches the
/// raw source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCache {
    path: PathBuf,
}
impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replaces the cache with `entries`.
    ///
    /// Written to a sibling temporary file first, so readers never see a
    /// half-written index.
    #[instrument(skip_all, fields(path = %self.path.display(), entries = entries.len()))]
    pub fn save(&self, entries: &[UnifiedEntry]) -> Result<()> {
        let parent = self.path.parent().ok_or_raise(|| ErrorKind::Io(self.path.clone()))?;
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
        let mut staged = NamedTempFile::new_in(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
        let mut writer = BufWriter::new(staged.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, entries).or_raise(|| ErrorKind::Io(self.path.clone()))?;
        writer.flush().or_raise(|| ErrorKind::Io(self.path.clone()))?;
        drop(writer);
        staged.persist(&self.path).or_raise(|| ErrorKind::Io(self.path.clone()))?;
        debug!("Saved index cache");
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<UnifiedEntry>> {
        let contents = fs::read(&self.path).or_raise(|| ErrorKind::Io(self.path.clone()))?;
        serde_json::from_slice(&contents).or_raise(|| ErrorKind::Corrupt(self.path.clone()))
    }

    /// Returns the cached index, or rebuilds and saves it.
    ///
    /// A missing cache always rebuilds. Otherwise `rebuild` only runs when
    /// `force_reload` is set.
    pub fn load_or_rebuild(
        &self,
        force_reload: bool,
        rebuild: impl FnOnce() -> Result<Vec<UnifiedEntry>>,
    ) -> Result<Vec<UnifiedEntry>> {
        if !force_reload && self.exists() {
            return self.load();
        }
        info!(forced = force_reload, "Rebuilding index");
        let entries = rebuild()?;
        self.save(&entries)?;
        Ok(entries)
    }

    /// The cached entries that came from `source`.
    pub fn entries_by_source(&self, source: &Source) -> Result<Vec<UnifiedEntry>> {
        let mut entries = self.load()?;
        entries.retain(|entry| entry.source_name == source.name && entry.source_kind == source.kind);
        Ok(entries)
    }
}
