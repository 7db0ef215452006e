use pindex_config::SourceKind;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The normalised browsing unit produced from a [`RawRecord`](crate::RawRecord).
///
/// This is also the on-disk shape of the preprocessed index: enums are
/// written by name and absent optional fields are omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnifiedEntry {
    pub id: String,
    pub source_name: String,
    pub source_kind: SourceKind,
    /// Never empty-by-null: falls back to the file name, then to `""`.
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Description with the change log and features sections appended.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<u32>,
    /// [`EPOCH`](pindex_config::EPOCH) when the publisher gave no date.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Variants of this entry. Only used for tag inheritance; never indexed on their own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_entries: Vec<UnifiedEntry>,
}
impl UnifiedEntry {
    /// Entries without a URL can't be downloaded, so they are never indexed.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// This entry followed by all of its related entries, depth-first.
    pub fn walk(&self) -> Vec<&UnifiedEntry> {
        let mut entries = vec![self];
        for related in &self.related_entries {
            entries.extend(related.walk());
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindex_config::EPOCH;

    fn entry(id: &str, url: &str, related: Vec<UnifiedEntry>) -> UnifiedEntry {
        UnifiedEntry {
            id: id.into(),
            source_name: "VPS".into(),
            source_kind: SourceKind::TableIndex,
            title: id.into(),
            authors: vec![],
            description: String::new(),
            change_log: None,
            category: None,
            url: url.into(),
            version: None,
            identity_number: None,
            last_updated: EPOCH,
            tags: vec![],
            related_entries: related,
        }
    }

    #[test]
    fn test_has_url() {
        assert!(entry("a", "http://x/a.vpx", vec![]).has_url());
        assert!(!entry("a", " \t", vec![]).has_url());
    }

    #[test]
    fn test_walk_is_depth_first() {
        let root = entry("a", "u", vec![entry("b", "", vec![entry("c", "", vec![])]), entry("d", "", vec![])]);
        let ids: Vec<_> = root.walk().into_iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(entry("a", "u", vec![])).unwrap();
        assert_eq!(json["SourceKind"], "TableIndex");
        assert_eq!(json["LastUpdated"], "1900-01-01T00:00:00Z");
        assert!(json.get("ChangeLog").is_none());
        assert!(json.get("RelatedEntries").is_none());
    }
}
