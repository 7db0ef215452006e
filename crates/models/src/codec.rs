//! Serde helpers for documents written by other tools.

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the type's default (e.g. an empty list).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional timestamps that tolerate the formats publishers actually emit.
///
/// Reads RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fraction]` (assumed UTC), or
/// a bare `YYYY-MM-DD`. An empty string reads as `None`. Always writes RFC 3339.
pub(crate) mod lenient_datetime {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{Date, OffsetDateTime, PrimitiveDateTime};

    pub(crate) fn parse(value: &str) -> Option<OffsetDateTime> {
        let value = value.trim();
        if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
            return Some(parsed);
        }
        let naive = PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
        .or_else(|_| PrimitiveDateTime::parse(value, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")));
        if let Ok(naive) = naive {
            return Some(naive.assume_utc());
        }
        Date::parse(value, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight().assume_utc())
    }

    pub(crate) fn serialize<S: Serializer>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::option::serialize(value, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => parse(&value).map(Some).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}
