//! Deciding when to re-download sources, and doing it.

use crate::display_timestamp;
use pindex_config::{Layout, RefreshState, Source};
use pindex_fetch::FetcherHandle;
use pindex_models::{Message, Report};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

const REFRESH_COMPLETED: &str = "Database refresh completed.";

/// The outcome of one [`Scheduler::download`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Whether a fresh copy was written to disk.
    pub fetched: bool,
    pub message: Message,
}

/// Owns the refresh state and the fetcher, and runs refresh passes.
pub struct Scheduler {
    layout: Layout,
    state: RefreshState,
    fetcher: FetcherHandle,
}
impl Scheduler {
    pub fn new(layout: Layout, state: RefreshState, fetcher: FetcherHandle) -> Self {
        Self { layout, state, fetcher }
    }

    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    pub fn next_refresh(&self) -> OffsetDateTime {
        self.state.next_refresh()
    }

    /// Due once the recheck interval has elapsed, or whenever the local copy is missing.
    ///
    /// Invalid sources are never due.
    pub fn should_refresh(&self, source: &Source, now: OffsetDateTime) -> bool {
        source.is_valid() && (self.state.is_due(now) || !self.layout.source_exists(source))
    }

    /// Fetches `source` if it is due (or `force` is set).
    ///
    /// Never fails: the outcome is described by the returned message.
    #[instrument(skip_all, fields(source = %source.name))]
    pub fn download(&self, source: &Source, now: OffsetDateTime, force: bool) -> Download {
        let Some(path) = self.layout.source_path(source) else {
            info!(url = %source.url, "Missing URL on source; skipped");
            return Download {
                fetched: false,
                message: Message::warning(format!("Skipping {}: no usable URL", source.name)),
            };
        };
        if !force && !self.should_refresh(source, now) {
            let text = format!(
                "Not at recheck minutes threshold. Next Refresh: {}. Database: {}",
                display_timestamp(self.next_refresh()),
                source.name
            );
            info!("{text}");
            return Download { fetched: false, message: Message::info(text) };
        }
        match self.fetcher.fetch(source, &path) {
            Ok(bytes) => {
                info!(bytes, fetcher = self.fetcher.name(), "Downloaded {} to {}", source.url, path.display());
                Download {
                    fetched: true,
                    message: Message::info(format!("Downloaded {} to {}", source.url, path.display())),
                }
            },
            Err(e) => {
                warn!(error = ?e, "Unable to download {} to {}", source.url, path.display());
                Download {
                    fetched: false,
                    message: Message::error(format!(
                        "Unable to download {} to {}: {}",
                        source.url,
                        path.display(),
                        &*e
                    )),
                }
            },
        }
    }

    /// Runs one refresh pass over `sources`, in order.
    ///
    /// If any valid source is missing on disk, every source is due this pass.
    /// The refresh timestamp moves to `now` only if something downloaded;
    /// a pass where every fetch fails leaves it untouched.
    /// `progress` receives 0, then a running percentage per source, then 100.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn refresh_all(&mut self, sources: &[Source], now: OffsetDateTime, progress: &mut dyn FnMut(u8)) -> Report {
        let mut report = Report::new();
        progress(0);
        let forced = sources.iter().any(|source| source.is_valid() && !self.layout.source_exists(source));
        if forced {
            info!("A source file is missing; forcing a refresh of every source");
        }
        for (position, source) in sources.iter().enumerate() {
            let download = self.download(source, now, forced);
            report.result |= download.fetched;
            report.push(download.message);
            progress(percentage(position + 1, sources.len()));
        }
        if report.result
            && let Err(e) = self.state.record_refresh(now)
        {
            warn!(error = ?e, "Could not save refresh state");
            report.push(Message::error(format!("Could not save refresh state: {}", &*e)));
        }
        report.push(Message::info(REFRESH_COMPLETED));
        progress(100);
        report
    }
}

fn percentage(done: usize, total: usize) -> u8 {
    u8::try_from(done * 100 / total.max(1)).unwrap_or(100)
}
