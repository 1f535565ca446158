//! Open-minutes calculation for a table from a candidate start time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Result of an availability query.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct Availability {
    /// Whole minutes open before the next booking (ceil of the gap,
    /// floored at 0), or the configured cap when nothing is upcoming.
    pub available_minutes: i64,
    /// Start of the next booking, when one exists.
    pub next_booking_at: Option<DateTime<Utc>>,
}

/// Computes the open gap from `from` to the earliest upcoming booking
/// start, capped at `max_unbooked_minutes` when no booking follows.
#[must_use]
pub fn availability(
    from: DateTime<Utc>,
    next_booking_start: Option<DateTime<Utc>>,
    max_unbooked_minutes: i64,
) -> Availability {
    match next_booking_start {
        Some(next) => {
            let gap_ms = next.timestamp_millis() - from.timestamp_millis();
            // Ceil of gap_ms / 60_000; div_euclid floors, so a negative
            // gap lands at or below zero and the max() clamps it.
            let minutes = (gap_ms + 59_999).div_euclid(60_000).max(0);
            Availability {
                available_minutes: minutes,
                next_booking_at: Some(next),
            }
        }
        None => Availability {
            available_minutes: max_unbooked_minutes,
            next_booking_at: None,
        },
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, min, sec) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn gap_to_next_booking_in_minutes() {
        let from = at(18, 0, 0);
        let next = from + Duration::minutes(90);
        let a = availability(from, Some(next), 120);
        assert_eq!(a.available_minutes, 90);
        assert_eq!(a.next_booking_at, Some(next));
    }

    #[test]
    fn partial_minutes_round_up() {
        let from = at(18, 0, 0);
        let next = at(18, 30, 1);
        let a = availability(from, Some(next), 120);
        assert_eq!(a.available_minutes, 31);
    }

    #[test]
    fn no_upcoming_booking_returns_cap() {
        let a = availability(at(18, 0, 0), None, 120);
        assert_eq!(a.available_minutes, 120);
        assert_eq!(a.next_booking_at, None);
    }

    #[test]
    fn booking_already_started_floors_at_zero() {
        let from = at(18, 0, 0);
        let next = at(17, 0, 0);
        let a = availability(from, Some(next), 120);
        assert_eq!(a.available_minutes, 0);
    }

    #[test]
    fn sub_minute_past_start_still_floors_at_zero() {
        let from = at(18, 0, 0);
        let next = at(17, 59, 30);
        let a = availability(from, Some(next), 120);
        assert_eq!(a.available_minutes, 0);
    }

    #[test]
    fn exact_minute_boundary_does_not_round_up() {
        let from = at(18, 0, 0);
        let next = at(18, 30, 0);
        let a = availability(from, Some(next), 120);
        assert_eq!(a.available_minutes, 30);
    }
}
