//! Timestamp formats used in reports and history logs

use chrono::{DateTime, Utc};

/// Format a time as an HTTP date, e.g. `Tue, 08 Apr 2025 21:16:16 GMT`.
pub fn utc_string(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Time of day in UTC, e.g. `21:16:16`.
pub fn time_of_day(time: DateTime<Utc>) -> String {
    time.format("%H:%M:%S").to_string()
}

/// A file-name-safe rendering of [`utc_string`], e.g. `Tue_08_Apr_2025_21-16-16_GMT`.
pub fn filename_timestamp(time: DateTime<Utc>) -> String {
    time.format("%a_%d_%b_%Y_%H-%M-%S_GMT").to_string()
}

/// Parse a report timestamp written either as an RFC 2822 / HTTP date or RFC 3339.
pub fn parse_report_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Elapsed minutes between two instants with two decimals.
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let millis = (end - start).num_milliseconds() as f64;
    format!("{:.2}", millis / 60_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 8, 21, 16, 16).unwrap()
    }

    #[test]
    fn test_utc_string() {
        assert_eq!(utc_string(sample()), "Tue, 08 Apr 2025 21:16:16 GMT");
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day(sample()), "21:16:16");
    }

    #[test]
    fn test_filename_timestamp() {
        assert_eq!(filename_timestamp(sample()), "Tue_08_Apr_2025_21-16-16_GMT");
    }

    #[test]
    fn test_parse_round_trips_http_date() {
        assert_eq!(parse_report_time(&utc_string(sample())), Some(sample()));
    }

    #[test]
    fn test_parse_accepts_rfc3339() {
        assert_eq!(
            parse_report_time("2025-04-08T21:16:16.000Z"),
            Some(sample())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_report_time("yesterday-ish"), None);
        assert_eq!(parse_report_time(""), None);
    }

    #[test]
    fn test_elapsed_minutes() {
        let start = sample();
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(90)), "1.50");
        assert_eq!(elapsed_minutes(start, start), "0.00");
    }
}
