//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats accepted for timestamps without an offset
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Formats accepted for plain calendar dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse an ISO-like date string into the wall-clock time it was written with
fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Parse a date string into an instant used for ordering
///
/// Strings without an offset are taken as UTC. Returns `None` for empty or
/// unparsable input.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_naive(s).map(|dt| dt.and_utc())
}

/// Format a date string in long form (like "December 5, 2025")
///
/// The calendar date is used as written, with no timezone shift. Empty input
/// gives an empty string; unparsable input is returned unchanged.
pub fn long_date(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    match parse_naive(s) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => s.to_string(),
    }
}

/// Convert a Unix timestamp in seconds to a `YYYY-MM-DD` date string
pub fn timestamp_to_date(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_long_date() {
        assert_eq!(long_date("2025-12-05"), "December 5, 2025");
        assert_eq!(long_date("2024-01-15T23:30:00+09:00"), "January 15, 2024");
        assert_eq!(long_date("2024/03/09"), "March 9, 2024");
    }

    #[test]
    fn test_long_date_edge_cases() {
        assert_eq!(long_date(""), "");
        assert_eq!(long_date("someday"), "someday");
    }

    #[test]
    fn test_parse_instant() {
        let expected = Utc.with_ymd_and_hms(2025, 12, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_instant("2025-12-05"), Some(expected));
        assert_eq!(parse_instant("2025-12-05T09:00:00+09:00"), Some(expected));
        assert_eq!(parse_instant("not a date"), None);
        assert_eq!(parse_instant(""), None);
    }

    #[test]
    fn test_timestamp_to_date() {
        assert_eq!(timestamp_to_date(1_700_000_000).as_deref(), Some("2023-11-14"));
    }
}
