//! Refreshing, loading and indexing of pindex sources.
//!
//! A refresh pass ([`Scheduler`]) downloads due sources; the [`Loader`]
//! parses them; [`build_index`] merges table records with identity
//! cross-references into [`UnifiedEntry`](pindex_models::UnifiedEntry)s; the
//! [`IndexCache`] keeps the result on disk until the next rebuild.
//! [`DatabaseManager`] ties these together.

mod build;
mod cache;
pub mod error;
mod load;
mod manager;
mod query;
mod schedule;
mod tags;

pub use crate::build::{build_entry, build_index};
pub use crate::cache::IndexCache;
pub use crate::load::Loader;
pub use crate::manager::DatabaseManager;
pub use crate::query::EntryQuery;
pub use crate::schedule::{Download, Scheduler};
pub use crate::tags::collect_tags;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Timestamps in messages are RFC 3339.
pub(crate) fn display_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_else(|_| timestamp.to_string())
}
