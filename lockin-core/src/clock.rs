//! Calendar-key helpers.
//!
//! The engine never reads the wall clock; callers inject `now` as a
//! `chrono::NaiveDateTime` in the user's local time. Cadence bookkeeping is
//! stored as plain strings so persisted records stay human-readable.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Calendar-day key, e.g. `2024-01-02`.
#[must_use]
pub fn day_key(now: NaiveDateTime) -> String {
    now.date().format("%Y-%m-%d").to_string()
}

/// ISO year-week key, e.g. `2024-W01`.
#[must_use]
pub fn week_key(now: NaiveDateTime) -> String {
    let iso = now.date().iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Whole-day gap between two day keys. `None` if either key does not parse,
/// which a fresh (empty) marker deliberately triggers.
#[must_use]
pub fn day_gap(from: &str, to: &str) -> Option<i64> {
    let from = NaiveDate::parse_from_str(from, "%Y-%m-%d").ok()?;
    let to = NaiveDate::parse_from_str(to, "%Y-%m-%d").ok()?;
    Some((to - from).num_days())
}

/// Hour of day in `0..24` for time-of-day title unlocks.
#[must_use]
pub fn hour_of(now: NaiveDateTime) -> u32 {
    now.time().hour()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn day_key_is_iso_date() {
        assert_eq!(day_key(at(2024, 1, 2, 9)), "2024-01-02");
    }

    #[test]
    fn week_key_uses_iso_week_year() {
        // 2024-01-01 is a Monday, ISO week 1 of 2024.
        assert_eq!(week_key(at(2024, 1, 1, 0)), "2024-W01");
        // 2023-01-01 is a Sunday, still ISO week 52 of 2022.
        assert_eq!(week_key(at(2023, 1, 1, 0)), "2022-W52");
    }

    #[test]
    fn day_gap_counts_calendar_days() {
        assert_eq!(day_gap("2024-01-01", "2024-01-02"), Some(1));
        assert_eq!(day_gap("2024-01-01", "2024-01-05"), Some(4));
        assert_eq!(day_gap("2024-01-02", "2024-01-01"), Some(-1));
        assert_eq!(day_gap("", "2024-01-01"), None);
        assert_eq!(day_gap("not-a-date", "2024-01-01"), None);
    }

    #[test]
    fn hour_of_returns_local_hour() {
        assert_eq!(hour_of(at(2024, 1, 1, 23)), 23);
    }
}
