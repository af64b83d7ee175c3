//! Shared utility functions

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// This helper is used throughout the database layer to handle datetime parsing
/// with a fallback to the current time if parsing fails.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an optional `YYYY-MM-DD` date column
///
/// NULL and unparseable values both map to `None`; expiry checks treat a
/// missing date as "no expiry".
pub fn parse_date_opt(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let invalid_time = "invalid";
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now(invalid_time);
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_parse_date_opt() {
        assert_eq!(
            parse_date_opt(Some("2025-06-30")),
            NaiveDate::from_ymd_opt(2025, 6, 30)
        );
        assert_eq!(parse_date_opt(Some("not-a-date")), None);
        assert_eq!(parse_date_opt(None), None);
    }
}
