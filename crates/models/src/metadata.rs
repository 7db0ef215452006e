use crate::IdentityRecord;

/// The identity-related fields of a front-end game record, as an editor sees them.
///
/// Everything is text because that's what a front-end database stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMetadata {
    pub display_name: Option<String>,
    pub manufacturer: Option<String>,
    pub year: Option<String>,
    pub theme: Option<String>,
    pub identity_number: Option<String>,
    pub machine_type: Option<String>,
    pub players: Option<String>,
}
impl TableMetadata {
    /// Copies the machine's fields over this record.
    ///
    /// Every mapped field is overwritten, including with `None`, so a stale
    /// value from a previously selected machine never survives. The display
    /// name is only replaced when `override_title` is set.
    pub fn fill_from_identity(&mut self, record: &IdentityRecord, override_title: bool) {
        if override_title {
            self.display_name = record.title.clone();
        }
        self.manufacturer = record.manufacturer_short_name.clone();
        self.year = record.date_of_manufacture.map(|date| date.year().to_string());
        self.theme = record.theme.clone();
        self.identity_number = Some(record.identity_number.to_string());
        self.machine_type = record.type_short_name.clone();
        self.players = record.players.map(|players| players.to_string());
    }
}
