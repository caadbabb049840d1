//! Value conversions between tool inputs/outputs and the Freelo wire format.
//!
//! Freelo transfers money as an integer string of hundredths
//! (`"100025"` is 1000.25) and dates as ISO 8601.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::num::ParseIntError;

/// 1000.25 -> "100025"
pub fn format_currency(amount: f64) -> String {
    format!("{}", (amount * 100.0).round() as i64)
}

/// "100025" -> 1000.25
pub fn parse_currency(amount: &str) -> Result<f64, ParseIntError> {
    amount.trim().parse::<i64>().map(|v| v as f64 / 100.0)
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) and `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("{}..{}", format_date(start), format_date(end))
}

/// Splits `A..B` and checks both ends are dates.
pub fn parse_date_range(s: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = s.split_once("..")?;
    Some((parse_date(start)?, parse_date(end)?))
}

/// Minutes as decimal hours with two places: 90 -> "1.50".
pub fn hours(minutes: i64) -> String {
    format!("{:.2}", minutes as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn currency_round_trip() {
        assert_eq!(format_currency(1000.25), "100025");
        assert_eq!(parse_currency("100025").unwrap(), 1000.25);
        for cents in [0i64, 1, 99, 100, 12345, 100025, 9_999_999] {
            let amount = cents as f64 / 100.0;
            let s = format_currency(amount);
            assert_eq!(s, cents.to_string());
            assert_eq!(parse_currency(&s).unwrap(), amount);
        }
        assert!(parse_currency("12.5").is_err());
    }

    #[test]
    fn dates_parse_in_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2025-03-01"), Some(expected));
        assert_eq!(parse_date("2025-03-01T00:00:00"), Some(expected));
        assert_eq!(parse_date("2025-03-01T01:00:00+01:00"), Some(expected));
        assert_eq!(parse_date("2025-03-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2025-13-01"), None);
    }

    #[test]
    fn date_formatting() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 31, 12, 30, 0).unwrap();
        assert_eq!(format_date(start), "2025-01-01T00:00:00.000Z");
        assert_eq!(
            format_date_range(start, end),
            "2025-01-01T00:00:00.000Z..2025-01-31T12:30:00.000Z"
        );
        assert!(parse_date_range("2025-01-01..2025-01-31").is_some());
        assert!(parse_date_range("2025-01-01").is_none());
        assert!(parse_date_range("2025-01-01..soon").is_none());
    }

    #[test]
    fn hours_two_decimals() {
        assert_eq!(hours(120), "2.00");
        assert_eq!(hours(90), "1.50");
        assert_eq!(hours(0), "0.00");
    }
}
