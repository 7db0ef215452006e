use exn::ResultExt;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::codec::{lenient_datetime, null_as_default};
use crate::error::{ErrorKind, Result};

/// Embedded table metadata published alongside a [`RawRecord`].
///
/// Each enabled feature flag implies a structural tag, see [`TableInfo::tags`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TableInfo {
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
    #[serde(rename = "VR")]
    pub vr: bool,
    /// Full single screen (cabinet with one playfield/backglass display).
    #[serde(rename = "FSS")]
    pub full_single_screen: bool,
    pub rom_required: bool,
    /// Directb2s backglass available.
    #[serde(rename = "B2S")]
    pub backglass: bool,
    pub pup_pack: bool,
    pub alt_sound: bool,
    pub alt_color: bool,
    /// Surround sound feedback.
    #[serde(rename = "SSF")]
    pub surround_sound: bool,
}
impl TableInfo {
    /// Themes first, then one fixed label per enabled feature, in declaration order.
    pub fn tags(&self) -> Vec<String> {
        let flags = [
            (self.vr, "VR"),
            (self.full_single_screen, "FSS"),
            (self.rom_required, "ROM"),
            (self.backglass, "B2S"),
            (self.pup_pack, "PuP-Pack"),
            (self.alt_sound, "AltSound"),
            (self.alt_color, "AltColor"),
            (self.surround_sound, "SSF"),
        ];
        let mut tags = self.themes.clone();
        tags.extend(flags.into_iter().filter(|(enabled, _)| *enabled).map(|(_, label)| label.to_string()));
        tags
    }
}

/// A single table (or table variant) as published by a table-index source.
///
/// Field names follow the publisher's document format. Everything except the
/// identifier is optional there, and "optional" includes explicit `null`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(rename = "MajorCategory", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "IpdbNumber", default, skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(
        rename = "LastModifiedDateUtc",
        default,
        with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_info: Option<TableInfo>,
    /// Variants of this table, e.g. VR or mod releases.
    #[serde(
        rename = "RelatedEntries",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub related: Vec<RawRecord>,
}
impl RawRecord {
    /// Tags implied by the embedded table metadata.
    pub fn structural_tags(&self) -> Vec<String> {
        self.table_info.as_ref().map(TableInfo::tags).unwrap_or_default()
    }
}

/// The raw document published by a table-index source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDatabase {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<RawRecord>,
    #[serde(default, with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub last_refresh_date_utc: Option<OffsetDateTime>,
}
impl TableDatabase {
    pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(json.as_ref()).or_raise(|| ErrorKind::InvalidDocument("table database"))
    }
}
