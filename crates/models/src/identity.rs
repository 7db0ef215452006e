use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

use crate::codec::{lenient_datetime, null_as_default};
use crate::error::{ErrorKind, Result};

const IPDB_MACHINE_URL: &str = "https://www.ipdb.org/machine.cgi?id=";

/// A machine in the authoritative identity database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityRecord {
    #[serde(rename = "IpdbId")]
    pub identity_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_short_name: Option<String>,
    #[serde(default, with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub date_of_manufacture: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<u8>,
}
impl IdentityRecord {
    /// Manufacture year as a zero-padded four digit string.
    pub fn year(&self) -> Option<String> {
        self.date_of_manufacture.map(|date| format!("{:04}", date.year()))
    }

    /// Cross-reference tags: manufacturer, year, then machine type.
    pub fn tags(&self) -> Vec<String> {
        let manufacturer = self.manufacturer_short_name.clone().filter(|s| !s.trim().is_empty());
        let kind = self.type_short_name.clone().filter(|s| !s.trim().is_empty());
        [manufacturer, self.year(), kind].into_iter().flatten().collect()
    }

    pub fn ipdb_url(&self) -> String {
        format!("{IPDB_MACHINE_URL}{}", self.identity_number)
    }

    fn title_matches(&self, needle: &str) -> bool {
        self.title.as_deref().is_some_and(|title| title.to_lowercase().contains(needle))
    }
}

/// Anything that can resolve a free-text or identity-number query to a single machine.
///
/// Editor workflows use this to pick a machine and copy its fields, see
/// [`TableMetadata::fill_from_identity`](crate::TableMetadata::fill_from_identity).
pub trait IdentityLookup {
    fn lookup(&self, query: &str) -> Option<IdentityRecord>;
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct IdentityDocument {
    #[serde(rename = "Data", default, deserialize_with = "null_as_default")]
    data: Vec<IdentityRecord>,
}

/// The loaded identity database, indexed by identity number.
///
/// When a number appears more than once the first record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdentityDocument", into = "IdentityDocument")]
pub struct IdentityDatabase {
    records: Vec<IdentityRecord>,
    by_number: HashMap<u32, usize>,
}
impl From<IdentityDocument> for IdentityDatabase {
    fn from(document: IdentityDocument) -> Self {
        Self::new(document.data)
    }
}
impl From<IdentityDatabase> for IdentityDocument {
    fn from(database: IdentityDatabase) -> Self {
        Self { data: database.records }
    }
}
impl IdentityDatabase {
    pub fn new(records: Vec<IdentityRecord>) -> Self {
        let mut by_number = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_number.entry(record.identity_number).or_insert(position);
        }
        Self { records, by_number }
    }

    pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(json.as_ref()).or_raise(|| ErrorKind::InvalidDocument("identity database"))
    }

    pub fn get(&self, identity_number: u32) -> Option<&IdentityRecord> {
        self.by_number.get(&identity_number).and_then(|&position| self.records.get(position))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityRecord> {
        self.records.iter()
    }

    /// All records matching `query`, in database order.
    ///
    /// A numeric query matches the identity number; anything else matches
    /// titles containing it (case-insensitive). A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&IdentityRecord> {
        let query = query.trim();
        if query.is_empty() {
            return self.records.iter().collect();
        }
        if let Ok(number) = query.parse::<u32>() {
            return self.get(number).into_iter().collect();
        }
        let needle = query.to_lowercase();
        self.records.iter().filter(|record| record.title_matches(&needle)).collect()
    }
}
impl IdentityLookup for IdentityDatabase {
    /// An exact title match wins over the first partial match.
    fn lookup(&self, query: &str) -> Option<IdentityRecord> {
        let matches = self.search(query);
        let needle = query.trim().to_lowercase();
        matches
            .iter()
            .find(|record| record.title.as_deref().is_some_and(|title| title.to_lowercase() == needle))
            .or_else(|| matches.first())
            .map(|record| (*record).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use time::macros::datetime;

    #[fixture]
    fn database() -> IdentityDatabase {
        IdentityDatabase::from_json(
            r#"{ "Data": [
                { "IpdbId": 1234, "Title": "Theatre of Magic", "ManufacturerShortName": "Bally",
                  "DateOfManufacture": "1995-03-01T00:00:00", "TypeShortName": "SS", "Theme": "Magic", "Players": 4 },
                { "IpdbId": 2000, "Title": "Magic", "ManufacturerShortName": "Stern",
                  "DateOfManufacture": "1979-01-01", "TypeShortName": "SS" },
                { "IpdbId": 1234, "Title": "Duplicate", "ManufacturerShortName": "Nobody" },
                { "IpdbId": 7, "Title": "Gottlieb's Ancient", "DateOfManufacture": "0950-06-01" }
            ] }"#,
        )
        .unwrap()
    }

    #[rstest]
    fn test_get_first_wins(database: IdentityDatabase) {
        assert_eq!(database.len(), 4);
        assert_eq!(database.get(1234).and_then(|r| r.title.as_deref()), Some("Theatre of Magic"));
        assert!(database.get(9999).is_none());
    }

    #[rstest]
    fn test_tags(database: IdentityDatabase) {
        assert_eq!(database.get(1234).unwrap().tags(), ["Bally", "1995", "SS"]);
        assert_eq!(database.get(7).unwrap().tags(), ["0950"]);
        assert!(IdentityRecord::default().tags().is_empty());
    }

    #[rstest]
    #[case("1234", &[1234])]
    #[case("magic", &[1234, 2000])]
    #[case("  MAGIC ", &[1234, 2000])]
    #[case("nothing", &[])]
    #[case("", &[1234, 2000, 1234, 7])]
    fn test_search(database: IdentityDatabase, #[case] query: &str, #[case] expected: &[u32]) {
        let found: Vec<_> = database.search(query).iter().map(|r| r.identity_number).collect();
        assert_eq!(found, expected);
    }

    #[rstest]
    #[case("magic", Some(2000))]
    #[case("theatre", Some(1234))]
    #[case("7", Some(7))]
    #[case("nothing", None)]
    fn test_lookup(database: IdentityDatabase, #[case] query: &str, #[case] expected: Option<u32>) {
        assert_eq!(database.lookup(query).map(|r| r.identity_number), expected);
    }

    #[rstest]
    fn test_dates_and_url(database: IdentityDatabase) {
        let record = database.get(1234).unwrap();
        assert_eq!(record.date_of_manufacture, Some(datetime!(1995-03-01 0:00 UTC)));
        assert_eq!(record.ipdb_url(), "https://www.ipdb.org/machine.cgi?id=1234");
    }

    #[test]
    fn test_round_trip_rebuilds_index() {
        let database = IdentityDatabase::new(vec![IdentityRecord { identity_number: 5, ..Default::default() }]);
        let json = serde_json::to_string(&database).unwrap();
        assert!(json.starts_with("{\"Data\":"));
        let reloaded = IdentityDatabase::from_json(json).unwrap();
        assert!(reloaded.get(5).is_some());
    }
}
