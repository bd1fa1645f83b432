//! Shared date parsing helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an ISO-ish timestamp to UTC.
///
/// Accepts RFC 3339 (with or without Z), "YYYY-MM-DDTHH:MM:SS",
/// "YYYY-MM-DD HH:MM:SS" and bare dates (treated as midnight UTC).
/// Returns None rather than erroring — unparsable dates are excluded
/// from range-based computations, never fatal.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s.replace('Z', "+00:00"))
        .or_else(|_| DateTime::parse_from_rfc3339(s))
    {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
    {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let dt = parse_timestamp("2026-03-01T09:30:00-06:00").unwrap();
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn test_parse_timestamp_z_suffix() {
        let dt = parse_timestamp("2026-03-01T15:30:00Z").unwrap();
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn test_parse_timestamp_naive_and_date_only() {
        assert!(parse_timestamp("2026-03-01T15:30:00").is_some());
        assert!(parse_timestamp("2026-03-01 15:30:00").is_some());
        let dt = parse_timestamp("2026-03-01").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("31/02/2026").is_none());
    }
}
