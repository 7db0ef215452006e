use crate::tags::collect_tags;
use pindex_models::UnifiedEntry;
use time::OffsetDateTime;

/// A filter over unified entries.
///
/// An empty query matches everything. Every set criterion must match:
/// - `text`: contained in the title, description, or an author (case-insensitive).
/// - `updated_after` / `updated_before`: inclusive bounds on the last update.
/// - `tags`: each present on the entry or one of its related entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub text: Option<String>,
    pub updated_after: Option<OffsetDateTime>,
    pub updated_before: Option<OffsetDateTime>,
    pub tags: Vec<String>,
}
impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn updated_after(mut self, after: OffsetDateTime) -> Self {
        self.updated_after = Some(after);
        self
    }

    pub fn updated_before(mut self, before: OffsetDateTime) -> Self {
        self.updated_before = Some(before);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn matches(&self, entry: &UnifiedEntry) -> bool {
        self.matches_text(entry) && self.matches_dates(entry) && self.matches_tags(entry)
    }

    /// Matching entries, in index order.
    pub fn filter<'a>(&self, entries: &'a [UnifiedEntry]) -> Vec<&'a UnifiedEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }

    fn matches_text(&self, entry: &UnifiedEntry) -> bool {
        let Some(needle) = self.text.as_deref().map(str::trim).filter(|text| !text.is_empty()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        std::iter::once(&entry.title)
            .chain(std::iter::once(&entry.description))
            .chain(&entry.authors)
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_dates(&self, entry: &UnifiedEntry) -> bool {
        self.updated_after.is_none_or(|after| entry.last_updated >= after)
            && self.updated_before.is_none_or(|before| entry.last_updated <= before)
    }

    fn matches_tags(&self, entry: &UnifiedEntry) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let available = collect_tags([entry]);
        self.tags.iter().all(|tag| available.contains(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindex_config::{EPOCH, SourceKind};
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    fn entry(id: &str, title: &str, updated: OffsetDateTime, tags: &[&str]) -> UnifiedEntry {
        UnifiedEntry {
            id: id.into(),
            source_name: "VPS".into(),
            source_kind: SourceKind::TableIndex,
            title: title.into(),
            authors: vec!["VPW".into()],
            description: format!("{title} recreation"),
            change_log: None,
            category: None,
            url: format!("http://x/{id}.vpx"),
            version: None,
            identity_number: None,
            last_updated: updated,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            related_entries: vec![],
        }
    }

    #[fixture]
    fn entries() -> Vec<UnifiedEntry> {
        let mut tom = entry("tom", "Theatre of Magic", datetime!(2024-03-01 0:00 UTC), &["Bally", "SS"]);
        tom.related_entries.push(entry("tom-vr", "Theatre of Magic VR", EPOCH, &["VR"]));
        vec![
            tom,
            entry("afm", "Attack from Mars", datetime!(2023-06-15 0:00 UTC), &["Bally", "SS"]),
            entry("bk", "Black Knight", EPOCH, &["Williams"]),
        ]
    }

    fn ids(found: Vec<&UnifiedEntry>) -> Vec<&str> {
        found.into_iter().map(|entry| entry.id.as_str()).collect()
    }

    #[rstest]
    fn test_empty_matches_all(entries: Vec<UnifiedEntry>) {
        assert_eq!(ids(EntryQuery::new().filter(&entries)), ["tom", "afm", "bk"]);
    }

    #[rstest]
    #[case("magic", &["tom"])]
    #[case("MARS", &["afm"])]
    #[case("recreation", &["tom", "afm", "bk"])]
    #[case("vpw", &["tom", "afm", "bk"])]
    #[case("nothing", &[])]
    fn test_text(entries: Vec<UnifiedEntry>, #[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(ids(EntryQuery::new().text(text).filter(&entries)), expected);
    }

    #[rstest]
    fn test_date_bounds_are_inclusive(entries: Vec<UnifiedEntry>) {
        let query = EntryQuery::new().updated_after(datetime!(2023-06-15 0:00 UTC)).updated_before(datetime!(2024-03-01 0:00 UTC));
        assert_eq!(ids(query.filter(&entries)), ["tom", "afm"]);
        let query = EntryQuery::new().updated_before(datetime!(2000-01-01 0:00 UTC));
        assert_eq!(ids(query.filter(&entries)), ["bk"]);
    }

    #[rstest]
    fn test_tags_include_related(entries: Vec<UnifiedEntry>) {
        assert_eq!(ids(EntryQuery::new().tag("bally").filter(&entries)), ["tom", "afm"]);
        assert_eq!(ids(EntryQuery::new().tag("bally").tag("vr").filter(&entries)), ["tom"]);
        assert!(EntryQuery::new().tag("Stern").filter(&entries).is_empty());
    }
}
