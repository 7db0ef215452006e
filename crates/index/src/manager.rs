//! Single owner of settings, refresh state, loaded databases and the index.

use crate::cache::IndexCache;
use crate::error::{ErrorKind, Result};
use crate::load::Loader;
use crate::query::EntryQuery;
use crate::schedule::{Download, Scheduler};
use crate::tags::collect_tags;
use exn::ResultExt;
use pindex_config::{Layout, Settings, Source};
use pindex_fetch::{FetcherHandle, HttpFetcher};
use pindex_models::{IdentityDatabase, Message, Report, TagSet, UnifiedEntry};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

type ProgressFn = Box<dyn FnMut(u8) + Send>;

/// Everything needed to refresh sources and browse the unified index.
///
/// There is no global instance: construct one from [`Settings`] and pass it
/// around. It is `Send`; callers that share it between threads wrap it in a
/// `Mutex`, which also serializes writes to the refresh state and the cache.
pub struct DatabaseManager {
    settings: Settings,
    layout: Layout,
    scheduler: Scheduler,
    loader: Loader,
    cache: IndexCache,
    entries: Option<Vec<UnifiedEntry>>,
    needs_rebuild: bool,
    progress: Option<ProgressFn>,
}
impl DatabaseManager {
    /// Resolves the layout and refresh state from `settings`, fetching over HTTP.
    pub fn open(settings: Settings) -> Result<Self> {
        let layout = settings.layout().or_raise(|| ErrorKind::Config)?;
        let fetcher = HttpFetcher::new(settings.request_timeout()).or_raise(|| ErrorKind::Fetcher)?;
        Self::new(settings, layout, Arc::new(fetcher))
    }

    pub fn new(settings: Settings, layout: Layout, fetcher: FetcherHandle) -> Result<Self> {
        layout.ensure().or_raise(|| ErrorKind::Config)?;
        let state = settings.refresh_state(&layout).or_raise(|| ErrorKind::Config)?;
        Ok(Self {
            scheduler: Scheduler::new(layout.clone(), state, fetcher),
            loader: Loader::new(layout.clone()),
            cache: IndexCache::new(layout.index_path()),
            settings,
            layout,
            entries: None,
            needs_rebuild: false,
            progress: None,
        })
    }

    /// Receives 0 to 100 while a refresh pass runs.
    pub fn on_progress(&mut self, progress: impl FnMut(u8) + Send + 'static) {
        self.progress = Some(Box::new(progress));
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sources(&self) -> &[Source] {
        &self.settings.sources
    }

    pub fn next_refresh(&self) -> OffsetDateTime {
        self.scheduler.next_refresh()
    }

    pub fn should_refresh(&self, source: &Source, now: OffsetDateTime) -> bool {
        self.scheduler.should_refresh(source, now)
    }

    pub fn download(&self, source: &Source, now: OffsetDateTime, force: bool) -> Download {
        self.scheduler.download(source, now, force)
    }

    /// Runs a refresh pass over every configured source. Never fails.
    ///
    /// If anything downloaded, the next [`entries`](Self::entries) call rebuilds the index.
    pub fn refresh_all(&mut self, now: OffsetDateTime) -> Report {
        let mut silent = |_: u8| {};
        let progress: &mut dyn FnMut(u8) = match self.progress.as_mut() {
            Some(progress) => progress,
            None => &mut silent,
        };
        let report = self.scheduler.refresh_all(&self.settings.sources, now, progress);
        self.needs_rebuild |= report.result;
        report
    }

    pub fn refresh(&mut self) -> Report {
        self.refresh_all(OffsetDateTime::now_utc())
    }

    /// Re-reads every downloaded source from disk.
    pub fn load_databases(&mut self) -> Result<()> {
        self.loader.load_all(&self.settings.sources)
    }

    pub fn load(&mut self, source: &Source) -> Result<()> {
        self.loader.load(source)
    }

    pub fn identity(&self) -> Option<&IdentityDatabase> {
        self.loader.identity()
    }

    /// Entries for one source, built from its loaded raw database.
    pub fn build_index(&self, source: &Source) -> Vec<UnifiedEntry> {
        self.loader.build_index(source)
    }

    /// The unified index: read from the cache, or rebuilt from the raw sources.
    ///
    /// Rebuilds when `force_reload` is set, when the cache file is missing,
    /// or after a refresh pass downloaded something.
    pub fn entries(&mut self, force_reload: bool) -> Result<&[UnifiedEntry]> {
        let force_reload = force_reload || self.needs_rebuild;
        let loader = &mut self.loader;
        let sources = &self.settings.sources;
        let entries = self.cache.load_or_rebuild(force_reload, || {
            loader.load_all(sources)?;
            Ok(sources.iter().flat_map(|source| loader.build_index(source)).collect())
        })?;
        info!(entries = entries.len(), "Index ready");
        self.needs_rebuild = false;
        Ok(self.entries.insert(entries).as_slice())
    }

    /// Cached entries that came from `source`.
    pub fn entries_by_source(&self, source: &Source) -> Result<Vec<UnifiedEntry>> {
        self.cache.entries_by_source(source)
    }

    /// The tag vocabulary of the index, including tags of related entries.
    pub fn tags(&self) -> TagSet {
        match &self.entries {
            Some(entries) => collect_tags(entries),
            None => {
                warn!("No index built or loaded yet; no tags");
                TagSet::new()
            },
        }
    }

    pub fn search(&self, query: &EntryQuery) -> Vec<&UnifiedEntry> {
        self.entries.as_deref().map(|entries| query.filter(entries)).unwrap_or_default()
    }

    pub fn version_messages(&self) -> Vec<Message> {
        self.loader.version_messages(&self.settings.sources)
    }
}
