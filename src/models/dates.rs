//! Date and time helpers
//!
//! Timestamps are stored as local wall-clock text ("2025-01-09T14:30:00") so
//! lexical order equals chronological order in SQL range queries.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage format for intake timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Storage format for calendar days
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a timestamp; a bare date means midnight
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        TIMESTAMP_FORMAT,
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    parse_date(s).map(|d| d.and_time(NaiveTime::MIN))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Current local time truncated to whole seconds
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Start of the tracking day containing `date` when days begin at `offset_hours`
pub fn day_start(date: NaiveDate, offset_hours: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(offset_hours.min(23)))
}

/// Tracking day a timestamp belongs to
pub fn tracking_day(ts: NaiveDateTime, offset_hours: u32) -> NaiveDate {
    (ts - Duration::hours(i64::from(offset_hours.min(23)))).date()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_day_of_month(date);
    let next = add_months(first, 1);
    (next - first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = d("2015-01-02").and_hms_opt(16, 59, 59).unwrap();
        assert_eq!(parse_timestamp("2015-01-02T16:59:59"), Some(expected));
        assert_eq!(parse_timestamp("2015-01-02 16:59:59"), Some(expected));
        assert_eq!(
            parse_timestamp("2015-01-02"),
            Some(d("2015-01-02").and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_day_start_and_tracking_day_with_offset() {
        let start = day_start(d("2015-01-02"), 4);
        assert_eq!(format_timestamp(start), "2015-01-02T04:00:00");

        let late_night = d("2015-01-03").and_hms_opt(2, 30, 0).unwrap();
        assert_eq!(tracking_day(late_night, 4), d("2015-01-02"));
        assert_eq!(tracking_day(late_night, 0), d("2015-01-03"));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(d("2015-02-10")), 28);
        assert_eq!(days_in_month(d("2016-02-01")), 29);
        assert_eq!(days_in_month(d("2015-12-31")), 31);
        assert_eq!(days_in_month(d("2015-04-30")), 30);
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(d("2015-01-31"), 1), d("2015-02-28"));
        assert_eq!(add_months(d("2015-11-15"), 2), d("2016-01-15"));
    }
}
