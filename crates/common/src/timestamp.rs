//! Timestamp parsing for payloads and query filters
//!
//! Accepted forms: RFC 3339, `YYYY-MM-DD[T ]HH:MM[:SS[.f]]` with an optional
//! offset, and a bare `YYYY-MM-DD`. Values without an offset are UTC.
//! Everything is normalised to UTC before it reaches the database.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
pub use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Current time in the stored representation
pub fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Parse a timestamp in any accepted form
pub fn parse(value: &str) -> Option<DateTimeWithTimeZone> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).into());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc).into());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive).into());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).into())
}

/// serde adapter for required timestamp fields
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTimeWithTimeZone, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// serde adapter for optional timestamp fields
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTimeWithTimeZone>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap().into()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse("2024-08-31T20:00:00Z"), Some(utc(2024, 8, 31, 20, 0, 0)));
        assert_eq!(parse("2024-08-31T22:00:00+02:00"), Some(utc(2024, 8, 31, 20, 0, 0)));
        assert_eq!(parse("2024-08-31 20:00:00"), Some(utc(2024, 8, 31, 20, 0, 0)));
        assert_eq!(parse("2024-08-31T20:00:00"), Some(utc(2024, 8, 31, 20, 0, 0)));
        assert_eq!(parse("2024-08-31 20:00"), Some(utc(2024, 8, 31, 20, 0, 0)));
        assert_eq!(parse("2024-09-01"), Some(utc(2024, 9, 1, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("2024-13-01"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_normalised_to_utc() {
        let parsed = parse("2024-08-31T22:00:00+02:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }
}
