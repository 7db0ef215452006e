//! Data model shared across pindex.
//!
//! - [`RawRecord`] / [`TableDatabase`]: what a table-index source publishes.
//! - [`IdentityRecord`] / [`IdentityDatabase`]: the authoritative machine list,
//!   keyed by identity number.
//! - [`UnifiedEntry`]: the normalised browsing unit every source is merged into.
//! - [`Report`]: outcome messages for operations that report instead of failing.

mod codec;
mod entry;
pub mod error;
mod identity;
mod metadata;
mod record;
mod report;
mod tag;

pub use crate::entry::UnifiedEntry;
pub use crate::identity::{IdentityDatabase, IdentityLookup, IdentityRecord};
pub use crate::metadata::TableMetadata;
pub use crate::record::{RawRecord, TableDatabase, TableInfo};
pub use crate::report::{Level, Message, Report};
pub use crate::tag::{TagSet, clean_tag, normalize_tags};
