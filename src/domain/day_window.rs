//! UTC day-window computation for schedule queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::interval::Interval;

/// Computes the half-open 24-hour window `[00:00, +24h)` in UTC for the
/// given calendar date string (`YYYY-MM-DD`).
///
/// A missing or malformed date falls back to the UTC date of `now`
/// rather than failing the request — availability over strictness, so
/// callers must tolerate a window silently defaulting to today.
#[must_use]
pub fn day_window(date: Option<&str>, now: DateTime<Utc>) -> Interval {
    let day = date
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| now.date_naive());

    let start = day.and_time(NaiveTime::MIN).and_utc();
    Interval::new(start, start + Duration::hours(24))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(y, m, d, 12, 0, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn valid_date_yields_exact_utc_day() {
        let w = day_window(Some("2025-03-10"), noon(2024, 1, 1));
        assert_eq!(w.start.to_rfc3339(), "2025-03-10T00:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2025-03-11T00:00:00+00:00");
    }

    #[test]
    fn window_is_exactly_24_hours() {
        let w = day_window(Some("2025-03-10"), noon(2024, 1, 1));
        assert_eq!(w.end - w.start, Duration::hours(24));
    }

    #[test]
    fn missing_date_uses_today() {
        let now = noon(2025, 6, 1);
        let w = day_window(None, now);
        assert_eq!(w.start.to_rfc3339(), "2025-06-01T00:00:00+00:00");
    }

    #[test]
    fn malformed_date_falls_back_to_today() {
        let now = noon(2025, 6, 1);
        for bad in ["not-a-date", "2025-13-40", "2025/03/10", ""] {
            let w = day_window(Some(bad), now);
            assert_eq!(w.start.to_rfc3339(), "2025-06-01T00:00:00+00:00");
            assert!(w.is_well_formed());
        }
    }

    #[test]
    fn month_boundary_rolls_over() {
        let w = day_window(Some("2025-01-31"), noon(2024, 1, 1));
        assert_eq!(w.end.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }
}
