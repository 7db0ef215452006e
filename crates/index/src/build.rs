//! Conversion of raw table records into unified browsing entries.

use pindex_config::{EPOCH, Source, SourceKind};
use pindex_models::{IdentityDatabase, RawRecord, TableDatabase, UnifiedEntry, normalize_tags};
use tracing::info;

const CHANGE_LOG_HEADING: &str = "\n\nChange Log:\n";
const FEATURES_HEADING: &str = "\n\nFeatures:\n";

/// Builds the unified entries of one table database, in record order.
///
/// Records without a URL can't be downloaded and are left out (logged).
/// Related records are always kept: they only feed tag inheritance.
pub fn build_index(source: &Source, database: &TableDatabase, identity: Option<&IdentityDatabase>) -> Vec<UnifiedEntry> {
    database
        .entries
        .iter()
        .map(|record| build_entry(source, record, identity))
        .filter(|entry| {
            if !entry.has_url() {
                info!(source = %source.name, id = %entry.id, title = %entry.title, "Missing URL on entry; not indexed");
            }
            entry.has_url()
        })
        .collect()
}

/// Maps one raw record, and its related records, to a unified entry.
pub fn build_entry(source: &Source, record: &RawRecord, identity: Option<&IdentityDatabase>) -> UnifiedEntry {
    let title = non_blank(&record.title).or_else(|| non_blank(&record.file_name)).unwrap_or_default();
    let cross_reference = record
        .identity_number
        .and_then(|number| identity.and_then(|database| database.get(number)))
        .map(|machine| machine.tags())
        .unwrap_or_default();
    let tags = normalize_tags(record.tags.iter().cloned().chain(record.structural_tags()).chain(cross_reference));
    UnifiedEntry {
        id: record.id.clone(),
        source_name: source.name.clone(),
        source_kind: SourceKind::TableIndex,
        title,
        authors: record.authors.clone(),
        description: compose_description(record),
        change_log: record.change_log.clone(),
        category: record.category.clone(),
        url: record.url.clone().unwrap_or_default(),
        version: record.version.clone(),
        identity_number: record.identity_number,
        last_updated: record.last_modified.unwrap_or(EPOCH),
        tags,
        related_entries: record.related.iter().map(|related| build_entry(source, related, identity)).collect(),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|value| !value.trim().is_empty()).cloned()
}

/// The description followed by the change log and then the features, when present.
fn compose_description(record: &RawRecord) -> String {
    let mut description = record.description.clone().unwrap_or_default();
    for (heading, section) in [(CHANGE_LOG_HEADING, &record.change_log), (FEATURES_HEADING, &record.features)] {
        if let Some(section) = section.as_deref().filter(|section| !section.is_empty()) {
            description.push_str(heading);
            description.push_str(section);
        }
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindex_models::{IdentityRecord, TableInfo};
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn source() -> Source {
        Source::new("VPS", "https://example.com/vpsdb.json", SourceKind::TableIndex)
    }

    fn record(id: &str, url: Option<&str>) -> RawRecord {
        RawRecord {
            id: id.into(),
            title: Some(format!("Table {id}")),
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(None, None, None, "")]
    #[case(Some("Desc"), None, None, "Desc")]
    #[case(None, Some("v2"), Some("VR"), "\n\nChange Log:\nv2\n\nFeatures:\nVR")]
    #[case(Some("Desc"), None, Some("VR"), "Desc\n\nFeatures:\nVR")]
    #[case(Some("Desc"), Some(""), None, "Desc")]
    fn test_description(
        #[case] description: Option<&str>,
        #[case] change_log: Option<&str>,
        #[case] features: Option<&str>,
        #[case] expected: &str,
    ) {
        let record = RawRecord {
            description: description.map(str::to_string),
            change_log: change_log.map(str::to_string),
            features: features.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(compose_description(&record), expected);
    }

    #[rstest]
    #[case(Some("Title"), Some("file.vpx"), "Title")]
    #[case(None, Some("file.vpx"), "file.vpx")]
    #[case(Some("  "), Some("file.vpx"), "file.vpx")]
    #[case(None, None, "")]
    fn test_title_fallback(source: Source, #[case] title: Option<&str>, #[case] file_name: Option<&str>, #[case] expected: &str) {
        let record = RawRecord {
            title: title.map(str::to_string),
            file_name: file_name.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(build_entry(&source, &record, None).title, expected);
    }

    #[rstest]
    fn test_defaults(source: Source) {
        let entry = build_entry(&source, &record("1", Some("http://x/1.vpx")), None);
        assert_eq!(entry.last_updated, EPOCH);
        assert_eq!(entry.source_name, "VPS");
        assert_eq!(entry.source_kind, SourceKind::TableIndex);
        assert!(entry.tags.is_empty());
    }

    #[rstest]
    fn test_skips_entries_without_url(source: Source) {
        let database = TableDatabase {
            entries: vec![record("1", Some("http://x/1.vpx")), record("2", None), record("3", Some("   ")), record("4", Some("http://x/4.vpx"))],
            last_refresh_date_utc: None,
        };
        let ids: Vec<_> = build_index(&source, &database, None).into_iter().map(|entry| entry.id).collect();
        assert_eq!(ids, ["1", "4"]);
    }

    #[rstest]
    fn test_tags(source: Source) {
        let identity = IdentityDatabase::new(vec![IdentityRecord {
            identity_number: 1234,
            manufacturer_short_name: Some("Bally".into()),
            date_of_manufacture: Some(datetime!(1995-03-01 0:00 UTC)),
            type_short_name: Some("SS".into()),
            ..Default::default()
        }]);
        let record = RawRecord {
            tags: vec!["EM".into(), " em".into(), "Magic  Show".into(), "".into()],
            identity_number: Some(1234),
            table_info: Some(TableInfo { themes: vec!["Magic show".into()], vr: true, ..Default::default() }),
            ..record("1", Some("http://x/1.vpx"))
        };
        let entry = build_entry(&source, &record, Some(&identity));
        assert_eq!(entry.tags, ["EM", "Magic Show", "VR", "Bally", "1995", "SS"]);
        assert_eq!(build_entry(&source, &record, None).tags, ["EM", "Magic Show", "VR"]);
    }

    #[rstest]
    fn test_unknown_identity_is_ignored(source: Source) {
        let identity = IdentityDatabase::default();
        let record = RawRecord { identity_number: Some(99), ..record("1", Some("http://x/1.vpx")) };
        assert!(build_entry(&source, &record, Some(&identity)).tags.is_empty());
    }

    #[rstest]
    fn test_related_entries_are_built_and_kept(source: Source) {
        let record = RawRecord {
            related: vec![RawRecord {
                tags: vec!["Mod".into()],
                related: vec![record("1b", None)],
                ..record("1a", None)
            }],
            ..record("1", Some("http://x/1.vpx"))
        };
        let entry = build_entry(&source, &record, None);
        assert_eq!(entry.related_entries.len(), 1);
        assert_eq!(entry.related_entries[0].tags, ["Mod"]);
        assert_eq!(entry.related_entries[0].related_entries[0].id, "1b");
    }
}
