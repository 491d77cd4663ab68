//! Serde helpers for stored documents and partial-update DTOs.

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::types::Timestamp;

/// Deserialize a present field into `Some(value)`.
///
/// Combined with `#[serde(default)]` on an `Option<Option<T>>` field this
/// distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`), so a client can clear a nullable field.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize a timestamp written either as RFC 3339 or as a naive
/// ISO-8601 local time without offset. Naive values are taken as UTC.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(serde::de::Error::custom)
}
