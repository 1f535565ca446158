//! Overlap-freedom checks for a single table's timeline.
//!
//! The shared mutable resource in this system is a table's interval
//! timeline (bookings ∪ sessions). [`find_conflict`] is the one
//! decision function for all mutating paths: persistence fetches the
//! candidate table's sibling windows, this function applies the status
//! filters, self-exclusion, and the overlap rule. The SQL layer
//! narrows rows by interval but never decides.

use serde::Serialize;

use super::booking::BookingStatus;
use super::ids::{BookingId, SessionId};
use super::interval::Interval;
use super::session::SessionStatus;

/// A sibling booking's window as fetched for a conflict scan.
#[derive(Debug, Clone, Copy)]
pub struct BookingWindow {
    /// Booking identity (for self-exclusion and conflict reporting).
    pub id: BookingId,
    /// Reserved interval.
    pub interval: Interval,
    /// Current status; CANCELLED bookings never conflict.
    pub status: BookingStatus,
}

/// A sibling session's window as fetched for a conflict scan.
#[derive(Debug, Clone, Copy)]
pub struct SessionWindow {
    /// Session identity (for self-exclusion and conflict reporting).
    pub id: SessionId,
    /// Occupancy interval.
    pub interval: Interval,
    /// Current status; only running sessions conflict.
    pub status: SessionStatus,
}

/// Which sibling kind blocked a proposed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Conflict {
    /// A non-cancelled booking occupies part of the interval.
    Booking(BookingId),
    /// A running session occupies part of the interval.
    Session(SessionId),
}

/// Finds the first sibling blocking `candidate` on the same table.
///
/// Bookings conflict when non-cancelled and overlapping; sessions
/// conflict when running and overlapping. `exclude_booking` /
/// `exclude_session` drop the record being moved from its own scan.
/// Bookings are reported before sessions so the caller's 409 names the
/// planned reservation when both kinds collide.
#[must_use]
pub fn find_conflict(
    candidate: Interval,
    bookings: &[BookingWindow],
    sessions: &[SessionWindow],
    exclude_booking: Option<BookingId>,
    exclude_session: Option<SessionId>,
) -> Option<Conflict> {
    let blocking_booking = bookings.iter().find(|b| {
        Some(b.id) != exclude_booking
            && b.status.blocks_interval()
            && b.interval.overlaps(&candidate)
    });
    if let Some(b) = blocking_booking {
        return Some(Conflict::Booking(b.id));
    }

    let blocking_session = sessions.iter().find(|s| {
        Some(s.id) != exclude_session
            && s.status == SessionStatus::Running
            && s.interval.overlaps(&candidate)
    });
    blocking_session.map(|s| Conflict::Session(s.id))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    fn booking(start: (u32, u32), end: (u32, u32), status: BookingStatus) -> BookingWindow {
        BookingWindow {
            id: BookingId::new(),
            interval: Interval::new(at(start.0, start.1), at(end.0, end.1)),
            status,
        }
    }

    fn session(start: (u32, u32), end: (u32, u32), status: SessionStatus) -> SessionWindow {
        SessionWindow {
            id: SessionId::new(),
            interval: Interval::new(at(start.0, start.1), at(end.0, end.1)),
            status,
        }
    }

    #[test]
    fn overlapping_booking_blocks() {
        let existing = booking((10, 0), (11, 0), BookingStatus::Active);
        let candidate = Interval::new(at(10, 30), at(11, 30));
        assert_eq!(
            find_conflict(candidate, &[existing], &[], None, None),
            Some(Conflict::Booking(existing.id))
        );
    }

    #[test]
    fn back_to_back_booking_does_not_block() {
        let existing = booking((10, 0), (11, 0), BookingStatus::Active);
        let candidate = Interval::new(at(11, 0), at(12, 0));
        assert_eq!(find_conflict(candidate, &[existing], &[], None, None), None);
    }

    #[test]
    fn cancelled_booking_frees_the_interval() {
        let cancelled = booking((10, 0), (11, 0), BookingStatus::Cancelled);
        let candidate = Interval::new(at(10, 0), at(11, 0));
        assert_eq!(
            find_conflict(candidate, &[cancelled], &[], None, None),
            None
        );
    }

    #[test]
    fn arrived_and_completed_bookings_still_block() {
        for status in [
            BookingStatus::Active,
            BookingStatus::Arrived,
            BookingStatus::NoShow,
            BookingStatus::Completed,
        ] {
            let existing = booking((10, 0), (11, 0), status);
            let candidate = Interval::new(at(10, 30), at(11, 30));
            assert!(
                find_conflict(candidate, &[existing], &[], None, None).is_some(),
                "{status:?} should block"
            );
        }
    }

    #[test]
    fn running_session_blocks_but_stopped_does_not() {
        let running = session((10, 0), (11, 0), SessionStatus::Running);
        let candidate = Interval::new(at(10, 30), at(11, 30));
        assert_eq!(
            find_conflict(candidate, &[], &[running], None, None),
            Some(Conflict::Session(running.id))
        );

        let stopped = session((10, 0), (11, 0), SessionStatus::Stopped);
        assert_eq!(find_conflict(candidate, &[], &[stopped], None, None), None);
    }

    #[test]
    fn self_exclusion_allows_moving_in_place() {
        let existing = booking((10, 0), (11, 0), BookingStatus::Active);
        // Shrinking the same booking overlaps its old window.
        let candidate = Interval::new(at(10, 0), at(10, 30));
        assert_eq!(
            find_conflict(candidate, &[existing], &[], Some(existing.id), None),
            None
        );

        let sess = session((14, 0), (15, 0), SessionStatus::Running);
        let extended = Interval::new(at(14, 0), at(15, 30));
        assert_eq!(
            find_conflict(extended, &[], &[sess], None, Some(sess.id)),
            None
        );
    }

    #[test]
    fn bookings_reported_before_sessions() {
        let b = booking((10, 0), (11, 0), BookingStatus::Active);
        let s = session((10, 0), (11, 0), SessionStatus::Running);
        let candidate = Interval::new(at(10, 0), at(11, 0));
        assert_eq!(
            find_conflict(candidate, &[b], &[s], None, None),
            Some(Conflict::Booking(b.id))
        );
    }

    // The create/conflict/boundary/delete/retry sequence from the
    // booking manager, played out against an in-memory timeline.
    #[test]
    fn booking_lifecycle_scenario() {
        let mut timeline: Vec<BookingWindow> = Vec::new();

        // [10:00,11:00) succeeds.
        let first = booking((10, 0), (11, 0), BookingStatus::Active);
        assert_eq!(
            find_conflict(first.interval, &timeline, &[], None, None),
            None
        );
        timeline.push(first);

        // [10:30,11:30) conflicts with the first.
        let overlapping = Interval::new(at(10, 30), at(11, 30));
        assert_eq!(
            find_conflict(overlapping, &timeline, &[], None, None),
            Some(Conflict::Booking(first.id))
        );

        // [11:00,12:00) is boundary-adjacent and succeeds.
        let adjacent = booking((11, 0), (12, 0), BookingStatus::Active);
        assert_eq!(
            find_conflict(adjacent.interval, &timeline, &[], None, None),
            None
        );
        timeline.push(adjacent);

        // Delete the first booking; the retry now succeeds.
        timeline.retain(|b| b.id != first.id);
        assert_eq!(find_conflict(overlapping, &timeline, &[], None, None), None);
    }
}
