//! Day-schedule aggregation: one merged, time-ascending timeline.
//!
//! Bookings and sessions are normalized into a single item shape and
//! merged. Equal start instants are tie-broken deterministically:
//! bookings before sessions, then id bytes, so repeated fetches of the
//! same day always render the same order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::booking::{Booking, BookingStatus, BookingTag, derive_tag};
use super::ids::TableId;
use super::interval::Interval;
use super::session::{SLOT_MINUTES, Session, SessionStatus, round_up_to_slot};

/// Which entity a schedule item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Planned reservation.
    Booking,
    /// Live or past occupancy.
    Session,
}

/// A normalized schedule entry for the dashboard timeline.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduleItem {
    /// Source record id (booking or session).
    pub id: uuid::Uuid,
    /// Table the item occupies.
    pub table_id: TableId,
    /// Item start instant.
    pub start_at: DateTime<Utc>,
    /// Item end instant.
    pub end_at: DateTime<Utc>,
    /// Display label: the booking's party name, or "Walk-in" for a
    /// running session.
    pub label: Option<String>,
    /// Staff notes (bookings only).
    pub notes: Option<String>,
    /// Source status in storage form.
    pub status: String,
    /// Source entity kind.
    pub kind: ItemKind,
    /// Derived booking tag (ARRIVED / NO-SHOW / DUE), absent on sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<BookingTag>,
}

impl ScheduleItem {
    /// The item's time interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        Interval::new(self.start_at, self.end_at)
    }

    fn from_booking(b: &Booking, now: DateTime<Utc>) -> Self {
        Self {
            id: (*b.id.as_uuid()),
            table_id: b.table_id,
            start_at: b.start_at,
            end_at: b.end_at,
            label: b.party_name.clone(),
            notes: b.notes.clone(),
            status: b.status.as_str().to_string(),
            kind: ItemKind::Booking,
            tag: derive_tag(b.status, b.interval(), now),
        }
    }

    fn from_session(s: &Session) -> Self {
        let label = match s.status {
            SessionStatus::Running => "Walk-in".to_string(),
            SessionStatus::Stopped => s.status.as_str().to_string(),
        };
        Self {
            id: (*s.id.as_uuid()),
            table_id: s.table_id,
            start_at: s.starts_at,
            end_at: s.ends_at,
            label: Some(label),
            notes: None,
            status: s.status.as_str().to_string(),
            kind: ItemKind::Session,
            tag: None,
        }
    }
}

/// Normalizes and merges bookings and sessions into one timeline,
/// sorted ascending by start with the deterministic tie-break.
#[must_use]
pub fn merge_items(bookings: &[Booking], sessions: &[Session], now: DateTime<Utc>) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = bookings
        .iter()
        .map(|b| ScheduleItem::from_booking(b, now))
        .chain(sessions.iter().map(ScheduleItem::from_session))
        .collect();
    items.sort_by(|a, b| {
        a.start_at
            .cmp(&b.start_at)
            .then(a.kind.cmp(&b.kind))
            .then(a.id.cmp(&b.id))
    });
    items
}

/// Display state of a single grid slot on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// Nothing occupies the slot.
    Free,
    /// A non-cancelled booking covers the slot.
    Booked,
    /// A session covers the slot; always wins over a booking.
    Live,
}

/// The 15-minute grid slot containing `instant`, half-open. An instant
/// already on a boundary starts its own slot.
#[must_use]
pub fn slot_containing(instant: DateTime<Utc>) -> Interval {
    let slot = chrono::Duration::minutes(SLOT_MINUTES);
    let mut end = round_up_to_slot(instant);
    if end == instant {
        end += slot;
    }
    Interval::new(end - slot, end)
}

/// Classifies one table's slot against the merged items.
///
/// A session covering any part of the slot yields [`SlotState::Live`]
/// even when a booking also covers it — a live walk-in visually
/// overrides an overlapping stale booking.
#[must_use]
pub fn classify_slot(table_id: TableId, slot: Interval, items: &[ScheduleItem]) -> SlotState {
    let mut booked = false;
    for item in items.iter().filter(|i| i.table_id == table_id) {
        if !item.interval().overlaps(&slot) {
            continue;
        }
        match item.kind {
            ItemKind::Session => return SlotState::Live,
            ItemKind::Booking => {
                if item.status != BookingStatus::Cancelled.as_str() {
                    booked = true;
                }
            }
        }
    }
    if booked { SlotState::Booked } else { SlotState::Free }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ids::{BookingId, SessionId, VenueId};
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    fn booking(table: TableId, start: (u32, u32), end: (u32, u32)) -> Booking {
        Booking {
            id: BookingId::new(),
            venue_id: VenueId::new(),
            table_id: table,
            start_at: at(start.0, start.1),
            end_at: at(end.0, end.1),
            party_name: Some("Smith".to_string()),
            notes: None,
            status: BookingStatus::Active,
            arrived_at: None,
            no_show_at: None,
            cancelled_at: None,
            created_at: at(0, 0),
        }
    }

    fn session(
        table: TableId,
        start: (u32, u32),
        end: (u32, u32),
        status: SessionStatus,
    ) -> Session {
        Session {
            id: SessionId::new(),
            venue_id: VenueId::new(),
            table_id: table,
            device_id: None,
            starts_at: at(start.0, start.1),
            ends_at: at(end.0, end.1),
            status,
            created_at: at(0, 0),
        }
    }

    #[test]
    fn merged_items_sorted_by_start() {
        let table = TableId::new();
        let bookings = vec![booking(table, (14, 0), (15, 0)), booking(table, (10, 0), (11, 0))];
        let sessions = vec![session(table, (12, 0), (13, 0), SessionStatus::Running)];

        let items = merge_items(&bookings, &sessions, at(9, 0));
        let starts: Vec<DateTime<Utc>> = items.iter().map(|i| i.start_at).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn equal_starts_put_bookings_before_sessions() {
        let table = TableId::new();
        let bookings = vec![booking(table, (10, 0), (11, 0))];
        let sessions = vec![session(table, (10, 0), (10, 45), SessionStatus::Running)];

        let items = merge_items(&bookings, &sessions, at(9, 0));
        let kinds: Vec<ItemKind> = items.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Booking, ItemKind::Session]);
    }

    #[test]
    fn running_session_labeled_walk_in() {
        let table = TableId::new();
        let sessions = vec![
            session(table, (10, 0), (11, 0), SessionStatus::Running),
            session(table, (12, 0), (13, 0), SessionStatus::Stopped),
        ];
        let items = merge_items(&[], &sessions, at(9, 0));
        let labels: Vec<Option<String>> = items.iter().map(|i| i.label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                Some("Walk-in".to_string()),
                Some("stopped".to_string())
            ]
        );
    }

    #[test]
    fn booking_items_carry_derived_tags() {
        let table = TableId::new();
        let bookings = vec![booking(table, (10, 0), (11, 0))];
        let items = merge_items(&bookings, &[], at(10, 30));
        assert_eq!(items.first().and_then(|i| i.tag), Some(BookingTag::Due));
    }

    #[test]
    fn live_session_overrides_overlapping_booking_in_slot() {
        let table = TableId::new();
        let bookings = vec![booking(table, (10, 0), (11, 0))];
        let sessions = vec![session(table, (10, 0), (10, 45), SessionStatus::Running)];
        let items = merge_items(&bookings, &sessions, at(10, 0));

        let slot = Interval::new(at(10, 0), at(10, 15));
        assert_eq!(classify_slot(table, slot, &items), SlotState::Live);

        // Past the session's end the booking classification shows.
        let later = Interval::new(at(10, 45), at(11, 0));
        assert_eq!(classify_slot(table, later, &items), SlotState::Booked);
    }

    #[test]
    fn slot_containing_covers_the_instant_half_open() {
        let slot = slot_containing(at(10, 7));
        assert_eq!(slot, Interval::new(at(10, 0), at(10, 15)));

        // A boundary instant belongs to the slot it starts, not the
        // one it ends.
        let boundary = slot_containing(at(10, 15));
        assert_eq!(boundary, Interval::new(at(10, 15), at(10, 30)));
    }

    #[test]
    fn slot_is_free_for_other_tables() {
        let table = TableId::new();
        let other = TableId::new();
        let bookings = vec![booking(table, (10, 0), (11, 0))];
        let items = merge_items(&bookings, &[], at(9, 0));
        let slot = Interval::new(at(10, 0), at(10, 15));
        assert_eq!(classify_slot(other, slot, &items), SlotState::Free);
    }
}
