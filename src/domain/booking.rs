//! Booking entity: status vocabulary, transition planning, derived tags.
//!
//! Status transitions are deliberately free by default (staff correct
//! mistakes all the time); a strict mode makes CANCELLED/COMPLETED
//! terminal. Timestamp fields are stamped exactly once and never
//! cleared, so the record accumulates history across corrections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{BookingId, TableId, VenueId};
use super::interval::Interval;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Planned reservation, not yet resolved.
    Active,
    /// Party showed up.
    Arrived,
    /// Party never showed up.
    NoShow,
    /// Booking withdrawn; its interval no longer blocks the table.
    Cancelled,
    /// Visit finished.
    Completed,
}

impl BookingStatus {
    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Arrived => "ARRIVED",
            Self::NoShow => "NO_SHOW",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "ARRIVED" => Some(Self::Arrived),
            "NO_SHOW" => Some(Self::NoShow),
            "CANCELLED" => Some(Self::Cancelled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// True for statuses that end the booking's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Whether a booking in this status still reserves its interval.
    ///
    /// Only CANCELLED frees the table for other bookings/sessions.
    #[must_use]
    pub const fn blocks_interval(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// A booking record as the services see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identity.
    pub id: BookingId,
    /// Owning venue.
    pub venue_id: VenueId,
    /// Reserved table.
    pub table_id: TableId,
    /// Reserved start instant.
    pub start_at: DateTime<Utc>,
    /// Reserved end instant (strictly after start).
    pub end_at: DateTime<Utc>,
    /// Optional party name shown on the schedule.
    pub party_name: Option<String>,
    /// Free-text staff notes.
    pub notes: Option<String>,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Stamped once when the booking first enters ARRIVED.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Stamped once when the booking first enters NO_SHOW.
    pub no_show_at: Option<DateTime<Utc>>,
    /// Stamped once when the booking first enters CANCELLED.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The booking's reserved interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        Interval::new(self.start_at, self.end_at)
    }
}

/// Timestamp field associated with a status, stamped on first entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampField {
    /// `arrived_at`
    ArrivedAt,
    /// `no_show_at`
    NoShowAt,
    /// `cancelled_at`
    CancelledAt,
}

/// A validated status transition ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// The status to write.
    pub status: BookingStatus,
    /// Which timestamp field to stamp (if not already set).
    pub stamp: Option<StampField>,
}

/// Why a transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejected {
    /// The requested status cannot be set through the status operation.
    #[error("status cannot be set directly")]
    NotSettable,
    /// Strict mode forbids leaving a terminal status.
    #[error("booking is already closed")]
    Terminal,
}

/// Plans a status transition.
///
/// `requested` must be one of ARRIVED/NO_SHOW/CANCELLED/COMPLETED.
/// With `strict` off any transition between the five statuses is
/// allowed; with it on, a booking already CANCELLED or COMPLETED
/// cannot move again.
///
/// # Errors
///
/// Returns [`TransitionRejected`] when the request is not settable or
/// forbidden by strict mode.
pub fn plan_transition(
    current: BookingStatus,
    requested: BookingStatus,
    strict: bool,
) -> Result<StatusChange, TransitionRejected> {
    let stamp = match requested {
        BookingStatus::Active => return Err(TransitionRejected::NotSettable),
        BookingStatus::Arrived => Some(StampField::ArrivedAt),
        BookingStatus::NoShow => Some(StampField::NoShowAt),
        BookingStatus::Cancelled => Some(StampField::CancelledAt),
        BookingStatus::Completed => None,
    };

    if strict && current.is_terminal() {
        return Err(TransitionRejected::Terminal);
    }

    Ok(StatusChange {
        status: requested,
        stamp,
    })
}

/// Derived display tag for a booking, stateless over current fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum BookingTag {
    /// Party has arrived.
    Arrived,
    /// Party marked as a no-show.
    NoShow,
    /// The booking's window is happening right now.
    Due,
}

/// Computes the UI tag for a booking: ARRIVED/NO-SHOW pass through,
/// DUE when `now` falls inside the reserved window and the booking is
/// not terminal, otherwise no tag (implicitly "booked").
#[must_use]
pub fn derive_tag(
    status: BookingStatus,
    interval: Interval,
    now: DateTime<Utc>,
) -> Option<BookingTag> {
    match status {
        BookingStatus::Arrived => Some(BookingTag::Arrived),
        BookingStatus::NoShow => Some(BookingTag::NoShow),
        BookingStatus::Cancelled | BookingStatus::Completed => None,
        BookingStatus::Active => interval.contains(now).then_some(BookingTag::Due),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            BookingStatus::Active,
            BookingStatus::Arrived,
            BookingStatus::NoShow,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("SEATED"), None);
    }

    #[test]
    fn only_cancelled_frees_the_interval() {
        assert!(BookingStatus::Active.blocks_interval());
        assert!(BookingStatus::Arrived.blocks_interval());
        assert!(BookingStatus::NoShow.blocks_interval());
        assert!(BookingStatus::Completed.blocks_interval());
        assert!(!BookingStatus::Cancelled.blocks_interval());
    }

    #[test]
    fn transition_stamps_match_status() {
        let Ok(change) = plan_transition(BookingStatus::Active, BookingStatus::Arrived, false)
        else {
            panic!("transition rejected");
        };
        assert_eq!(change.stamp, Some(StampField::ArrivedAt));

        let Ok(change) = plan_transition(BookingStatus::Active, BookingStatus::Completed, false)
        else {
            panic!("transition rejected");
        };
        assert_eq!(change.stamp, None);
    }

    #[test]
    fn free_mode_allows_leaving_terminal_status() {
        assert!(plan_transition(BookingStatus::Cancelled, BookingStatus::Arrived, false).is_ok());
    }

    #[test]
    fn strict_mode_locks_terminal_statuses() {
        assert_eq!(
            plan_transition(BookingStatus::Cancelled, BookingStatus::Arrived, true),
            Err(TransitionRejected::Terminal)
        );
        assert_eq!(
            plan_transition(BookingStatus::Completed, BookingStatus::NoShow, true),
            Err(TransitionRejected::Terminal)
        );
        // Non-terminal statuses stay movable under strict mode.
        assert!(plan_transition(BookingStatus::Arrived, BookingStatus::NoShow, true).is_ok());
    }

    #[test]
    fn active_is_not_settable_directly() {
        assert_eq!(
            plan_transition(BookingStatus::Arrived, BookingStatus::Active, false),
            Err(TransitionRejected::NotSettable)
        );
    }

    #[test]
    fn tag_passes_through_arrived_and_no_show() {
        let window = Interval::new(at(10), at(11));
        assert_eq!(
            derive_tag(BookingStatus::Arrived, window, at(9)),
            Some(BookingTag::Arrived)
        );
        assert_eq!(
            derive_tag(BookingStatus::NoShow, window, at(9)),
            Some(BookingTag::NoShow)
        );
    }

    #[test]
    fn tag_is_due_only_inside_the_window() {
        let window = Interval::new(at(10), at(11));
        assert_eq!(
            derive_tag(BookingStatus::Active, window, at(10)),
            Some(BookingTag::Due)
        );
        assert_eq!(derive_tag(BookingStatus::Active, window, at(9)), None);
        assert_eq!(derive_tag(BookingStatus::Active, window, at(11)), None);
    }

    #[test]
    fn terminal_statuses_carry_no_tag_even_when_due() {
        let window = Interval::new(at(10), at(11));
        assert_eq!(derive_tag(BookingStatus::Cancelled, window, at(10)), None);
        assert_eq!(derive_tag(BookingStatus::Completed, window, at(10)), None);
    }
}
