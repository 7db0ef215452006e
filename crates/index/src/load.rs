//! Parsing of downloaded source files into typed databases.

use crate::build::build_index;
use crate::display_timestamp;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use pindex_config::{EPOCH, Layout, Source, SourceKind};
use pindex_models::{IdentityDatabase, Message, TableDatabase, UnifiedEntry};
use std::collections::HashMap;
use std::fs;
use tracing::{debug, info, instrument, warn};

/// Owns every database parsed from disk.
///
/// Table databases are keyed by source name. There is a single identity
/// database: loading another identity source replaces it.
#[derive(Debug, Clone)]
pub struct Loader {
    layout: Layout,
    tables: HashMap<String, TableDatabase>,
    identity: Option<IdentityDatabase>,
}
impl Loader {
    pub fn new(layout: Layout) -> Self {
        Self { layout, tables: HashMap::new(), identity: None }
    }

    /// Parses the downloaded file of `source`, if there is one.
    ///
    /// Invalid sources and sources that haven't been downloaded yet are
    /// skipped. A file that exists but can't be read or parsed is an error.
    #[instrument(skip_all, fields(source = %source.name))]
    pub fn load(&mut self, source: &Source) -> Result<()> {
        let Some(path) = self.layout.source_path(source) else {
            info!(url = %source.url, "Missing URL on source; skipped");
            return Ok(());
        };
        if !path.is_file() {
            debug!(path = %path.display(), "Source not downloaded yet");
            return Ok(());
        }
        let contents = fs::read(&path).or_raise(|| ErrorKind::Io(path.clone()))?;
        match source.kind {
            SourceKind::TableIndex => {
                let database = TableDatabase::from_json(contents).or_raise(|| ErrorKind::Corrupt(path.clone()))?;
                debug!(entries = database.entries.len(), "Loaded table database");
                self.tables.insert(source.name.clone(), database);
            },
            SourceKind::IdentityIndex => {
                let database = IdentityDatabase::from_json(contents).or_raise(|| ErrorKind::Corrupt(path.clone()))?;
                debug!(records = database.len(), "Loaded identity database");
                self.identity = Some(database);
            },
        }
        Ok(())
    }

    /// Forgets all table databases, then loads every source in order.
    ///
    /// Stops at the first source that fails to load.
    pub fn load_all(&mut self, sources: &[Source]) -> Result<()> {
        self.tables.clear();
        for source in sources {
            self.load(source)?;
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableDatabase> {
        self.tables.get(name)
    }

    pub fn identity(&self) -> Option<&IdentityDatabase> {
        self.identity.as_ref()
    }

    /// Unified entries for one source.
    ///
    /// Identity sources and invalid sources have no entries. A table source
    /// that hasn't been loaded yields nothing, with a warning.
    pub fn build_index(&self, source: &Source) -> Vec<UnifiedEntry> {
        if source.kind != SourceKind::TableIndex || !source.is_valid() {
            return Vec::new();
        }
        match self.tables.get(&source.name) {
            Some(database) => build_index(source, database, self.identity.as_ref()),
            None => {
                warn!(source = %source.name, "Database not loaded; no entries built");
                Vec::new()
            },
        }
    }

    /// One "last updated" line per loaded table database, in `sources` order.
    pub fn version_messages(&self, sources: &[Source]) -> Vec<Message> {
        sources
            .iter()
            .filter_map(|source| self.tables.get(&source.name).map(|database| (source, database)))
            .map(|(source, database)| {
                let updated = database.last_refresh_date_utc.unwrap_or(EPOCH);
                Message::info(format!("{} Database Last Updated (UTC): {}", source.name, display_timestamp(updated)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const TABLES: &str = r#"{ "LastRefreshDateUtc": "2024-02-01T08:00:00Z", "Entries": [
        { "Id": "tom", "Title": "Theatre of Magic", "Url": "http://x/tom.vpx", "Tags": ["EM"], "IpdbNumber": 1234 }
    ] }"#;
    const IDENTITY: &str = r#"{ "Data": [
        { "IpdbId": 1234, "ManufacturerShortName": "Bally", "DateOfManufacture": "1995-03-01", "TypeShortName": "SS" }
    ] }"#;

    struct Fixture {
        _dir: TempDir,
        layout: Layout,
        tables: Source,
        identity: Source,
    }

    #[fixture]
    fn workspace() -> Fixture {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        layout.ensure().unwrap();
        Fixture {
            _dir: dir,
            layout,
            tables: Source::new("VPS", "https://example.com/vpsdb.json", SourceKind::TableIndex),
            identity: Source::new("IPDB", "https://example.com/ipdbdatabase.json", SourceKind::IdentityIndex),
        }
    }

    fn write(layout: &Layout, source: &Source, contents: &str) {
        fs::write(layout.source_path(source).unwrap(), contents).unwrap();
    }

    #[rstest]
    fn test_load_all_and_build(workspace: Fixture) {
        write(&workspace.layout, &workspace.tables, TABLES);
        write(&workspace.layout, &workspace.identity, IDENTITY);
        let mut loader = Loader::new(workspace.layout.clone());
        loader.load_all(&[workspace.tables.clone(), workspace.identity.clone()]).unwrap();
        assert_eq!(loader.table("VPS").map(|db| db.entries.len()), Some(1));
        assert_eq!(loader.identity().map(IdentityDatabase::len), Some(1));
        let entries = loader.build_index(&workspace.tables);
        assert_eq!(entries[0].tags, ["EM", "Bally", "1995", "SS"]);
        assert!(loader.build_index(&workspace.identity).is_empty());
    }

    #[rstest]
    fn test_missing_files_are_skipped(workspace: Fixture) {
        let mut loader = Loader::new(workspace.layout.clone());
        loader.load_all(&[workspace.tables.clone(), workspace.identity.clone()]).unwrap();
        assert!(loader.table("VPS").is_none() && loader.identity().is_none());
        assert!(loader.build_index(&workspace.tables).is_empty());
    }

    #[rstest]
    fn test_invalid_source_is_skipped(workspace: Fixture) {
        let mut loader = Loader::new(workspace.layout.clone());
        loader.load(&Source::new("Broken", "", SourceKind::TableIndex)).unwrap();
        assert!(loader.table("Broken").is_none());
    }

    #[rstest]
    fn test_corrupt_file_is_fatal(workspace: Fixture) {
        write(&workspace.layout, &workspace.tables, "{ not json");
        let mut loader = Loader::new(workspace.layout.clone());
        let err = loader.load(&workspace.tables).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(_)));
    }

    #[rstest]
    fn test_reload_replaces_by_name(workspace: Fixture) {
        write(&workspace.layout, &workspace.tables, TABLES);
        let mut loader = Loader::new(workspace.layout.clone());
        loader.load(&workspace.tables).unwrap();
        write(&workspace.layout, &workspace.tables, r#"{ "Entries": [] }"#);
        loader.load(&workspace.tables).unwrap();
        assert_eq!(loader.table("VPS").map(|db| db.entries.len()), Some(0));
    }

    #[rstest]
    fn test_version_messages(workspace: Fixture) {
        write(&workspace.layout, &workspace.tables, TABLES);
        let mut loader = Loader::new(workspace.layout.clone());
        loader.load(&workspace.tables).unwrap();
        let messages = loader.version_messages(&[workspace.identity.clone(), workspace.tables.clone()]);
        assert_eq!(messages, [Message::info("VPS Database Last Updated (UTC): 2024-02-01T08:00:00Z")]);
    }
}
