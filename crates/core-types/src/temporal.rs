//! Strict parsing of date and timestamp strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parses `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`, or an
/// RFC 3339 timestamp with an offset, which is normalised to UTC.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Accepts either form; a bare date becomes midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s).or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-05 13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T15:00:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).map(|d| d.and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn rejects_loose_forms() {
        assert_eq!(parse_timestamp("05/03/2024"), None);
        assert_eq!(parse_timestamp("2024-3-5x"), None);
        assert_eq!(parse_date("2024-03-05 13:00:00"), None);
    }
}
