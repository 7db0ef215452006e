//! Configuration for pindex.
//!
//! Everything the rest of the workspace needs to know before touching the
//! network or the disk: which sources exist ([`Source`]), how often to
//! recheck them ([`Settings`]), where their files live ([`Layout`]), and when
//! they were last downloaded ([`RefreshState`]).

pub mod error;
mod layout;
mod path;
mod settings;
mod source;
mod state;

pub use crate::layout::Layout;
pub use crate::path::validate_file_name;
pub use crate::settings::Settings;
pub use crate::source::{Source, SourceKind};
pub use crate::state::RefreshState;
use time::OffsetDateTime;
use time::macros::datetime;

/// Sentinel for "no date known".
pub const EPOCH: OffsetDateTime = datetime!(1900-01-01 0:00 UTC);
