//! On-disk layout of the application data folder.
//!
//! ```text
//! <app-data>/
//! ├── refresh-state.json
//! └── Databases/
//!     ├── <last URL segment of each source>
//!     └── preprocesseddatabase.json
//! ```

use exn::ResultExt;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use crate::Source;
use crate::error::{ErrorKind, Result};

const DATABASES_FOLDER: &str = "Databases";
const INDEX_FILE: &str = "preprocesseddatabase.json";
const STATE_FILE: &str = "refresh-state.json";

/// Resolved locations of every file the system reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}
impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn databases_dir(&self) -> PathBuf {
        self.root.join(DATABASES_FOLDER)
    }

    /// Where the raw download of `source` lives, or `None` for an invalid source.
    pub fn source_path(&self, source: &Source) -> Option<PathBuf> {
        source.file_name().map(|name| self.databases_dir().join(name))
    }

    /// Whether the raw download of `source` is present on disk.
    ///
    /// Invalid sources never exist.
    pub fn source_exists(&self, source: &Source) -> bool {
        self.source_path(source).is_some_and(|path| path.is_file())
    }

    /// The preprocessed unified index.
    pub fn index_path(&self) -> PathBuf {
        self.databases_dir().join(INDEX_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// Creates the databases folder (and the root) if missing.
    pub fn ensure(&self) -> Result<()> {
        let dir = self.databases_dir();
        create_dir_all(&dir).or_raise(|| ErrorKind::Io(dir.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceKind;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let layout = Layout::new("/data/pindex");
        let source = Source::new("VPS", "https://example.com/db/vpsdb.json", SourceKind::TableIndex);
        assert_eq!(layout.source_path(&source), Some(PathBuf::from("/data/pindex/Databases/vpsdb.json")));
        assert_eq!(layout.index_path(), PathBuf::from("/data/pindex/Databases/preprocesseddatabase.json"));
        assert_eq!(layout.state_path(), PathBuf::from("/data/pindex/refresh-state.json"));
    }

    #[test]
    fn test_invalid_source_has_no_path() {
        let layout = Layout::new("/data/pindex");
        let source = Source::new("Broken", "", SourceKind::TableIndex);
        assert_eq!(layout.source_path(&source), None);
        assert!(!layout.source_exists(&source));
    }

    #[test]
    fn test_ensure_and_exists() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().join("nested"));
        layout.ensure().unwrap();
        assert!(layout.databases_dir().is_dir());

        let source = Source::new("VPS", "https://example.com/vpsdb.json", SourceKind::TableIndex);
        assert!(!layout.source_exists(&source));
        std::fs::write(layout.source_path(&source).unwrap(), b"{}").unwrap();
        assert!(layout.source_exists(&source));
    }
}
