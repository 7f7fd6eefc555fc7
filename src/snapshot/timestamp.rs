//! Timestamp parsing for exported records.
//!
//! The backend emits a mix of RFC 3339 instants, naive date-times and bare
//! dates. Everything is folded into one naive calendar frame (UTC for inputs
//! that carry an offset). Unparseable values are errors, never "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Malformed timestamp in field '{field}': {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("Missing required timestamp field '{0}'")]
    Missing(&'static str),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse one timestamp value. `field` names the source field for errors.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(TimestampError::Malformed {
        field,
        value: value.to_string(),
    })
}

/// Parse an optional field; blank strings count as absent.
pub fn parse_optional(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, TimestampError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_timestamp(field, v).map(Some),
    }
}

/// Parse a required field; blank or absent is an error.
pub fn parse_required(
    field: &'static str,
    value: Option<&str>,
) -> Result<NaiveDateTime, TimestampError> {
    parse_optional(field, value)?.ok_or(TimestampError::Missing(field))
}

/// Parse the `--now` reference instant, accepting the same formats.
pub fn parse_reference(value: &str) -> Result<NaiveDateTime, TimestampError> {
    parse_timestamp("now", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_rfc3339_normalizes_to_utc() {
        assert_eq!(
            parse_timestamp("created_at", "2024-03-01T10:00:00Z").unwrap(),
            expect(2024, 3, 1, 10, 0, 0)
        );
        assert_eq!(
            parse_timestamp("created_at", "2024-03-01T10:00:00.250+02:00").unwrap(),
            expect(2024, 3, 1, 8, 0, 0) + chrono::Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_parse_naive_formats() {
        assert_eq!(
            parse_timestamp("due_date", "2024-03-01 23:15:00").unwrap(),
            expect(2024, 3, 1, 23, 15, 0)
        );
        assert_eq!(
            parse_timestamp("due_date", "2024-03-01T23:15").unwrap(),
            expect(2024, 3, 1, 23, 15, 0)
        );
        assert_eq!(
            parse_timestamp("due_date", " 2024-03-01 ").unwrap(),
            expect(2024, 3, 1, 0, 0, 0)
        );
    }

    #[test]
    fn test_malformed_timestamp_names_field() {
        let err = parse_timestamp("completed_at", "next tuesday").unwrap_err();
        assert_eq!(
            err,
            TimestampError::Malformed {
                field: "completed_at",
                value: "next tuesday".to_string()
            }
        );
        assert!(err.to_string().contains("completed_at"));

        assert!(parse_timestamp("due_date", "2024-02-30").is_err());
    }

    #[test]
    fn test_optional_and_required() {
        assert_eq!(parse_optional("due_date", None), Ok(None));
        assert_eq!(parse_optional("due_date", Some("   ")), Ok(None));
        assert!(parse_optional("due_date", Some("2024-01-01")).unwrap().is_some());

        assert_eq!(
            parse_required("created_at", Some("")),
            Err(TimestampError::Missing("created_at"))
        );
        assert_eq!(
            parse_required("created_at", None),
            Err(TimestampError::Missing("created_at"))
        );
    }
}
