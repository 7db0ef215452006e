use pindex_models::{TagSet, UnifiedEntry};

/// Every tag of `entries` and, recursively, of their related entries.
///
/// First-seen order and casing win; see [`TagSet`].
pub fn collect_tags<'a>(entries: impl IntoIterator<Item = &'a UnifiedEntry>) -> TagSet {
    let mut tags = TagSet::new();
    for entry in entries.into_iter().flat_map(UnifiedEntry::walk) {
        tags.extend(&entry.tags);
    }
    tags
}
