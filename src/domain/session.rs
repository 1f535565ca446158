//! Session entity: live-occupancy records and their time arithmetic.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{DeviceId, SessionId, TableId, VenueId};
use super::interval::Interval;

/// Shortest duration a device may start a session for, in minutes.
pub const MIN_SESSION_MINUTES: i64 = 1;
/// Longest duration a device may start a session for, in minutes.
pub const MAX_SESSION_MINUTES: i64 = 240;
/// Duration used when a device start omits `minutes`.
pub const DEFAULT_SESSION_MINUTES: i64 = 60;
/// Grid the host "seat now" flow snaps session starts to.
pub const SLOT_MINUTES: i64 = 15;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Table is in use; at most one per table at any instant.
    Running,
    /// Session has ended (possibly earlier than scheduled).
    Stopped,
}

impl SessionStatus {
    /// Storage/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// A session record as the services see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session identity.
    pub id: SessionId,
    /// Owning venue.
    pub venue_id: VenueId,
    /// Occupied table.
    pub table_id: TableId,
    /// Device that started the session, when device-initiated.
    pub device_id: Option<DeviceId>,
    /// Occupancy start instant.
    pub starts_at: DateTime<Utc>,
    /// Scheduled (or actual, once stopped) end instant.
    pub ends_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Row creation instant.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// The session's occupancy interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        Interval::new(self.starts_at, self.ends_at)
    }
}

/// Clamps a requested device-session duration to the allowed range,
/// defaulting when absent.
#[must_use]
pub fn clamp_minutes(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_SESSION_MINUTES)
        .clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES)
}

/// Computes the new end instant of an extension: pushed forward from
/// the session's *current* end, never from the wall clock. Returns
/// `None` when the requested minutes do not fit in a representable
/// duration or push the end past the representable time range.
#[must_use]
pub fn extended_end(current_end: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(minutes).and_then(|delta| current_end.checked_add_signed(delta))
}

/// Rounds an instant up to the next 15-minute slot boundary.
///
/// An instant already on a boundary is returned unchanged. Used by the
/// "seat now" flow so host-started sessions align with the slot grid.
#[must_use]
pub fn round_up_to_slot(instant: DateTime<Utc>) -> DateTime<Utc> {
    let slot_ms = SLOT_MINUTES * 60_000;
    let ms = instant.timestamp_millis();
    let rounded = ms.div_euclid(slot_ms) * slot_ms + if ms % slot_ms == 0 { 0 } else { slot_ms };
    Utc.timestamp_millis_opt(rounded).single().unwrap_or(instant)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, min, sec) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [SessionStatus::Running, SessionStatus::Stopped] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("active"), None);
    }

    #[test]
    fn clamp_applies_floor_ceiling_and_default() {
        assert_eq!(clamp_minutes(None), DEFAULT_SESSION_MINUTES);
        assert_eq!(clamp_minutes(Some(0)), MIN_SESSION_MINUTES);
        assert_eq!(clamp_minutes(Some(-30)), MIN_SESSION_MINUTES);
        assert_eq!(clamp_minutes(Some(500)), MAX_SESSION_MINUTES);
        assert_eq!(clamp_minutes(Some(90)), 90);
    }

    #[test]
    fn extend_is_relative_to_current_end_not_now() {
        let end = at(22, 0, 0);
        assert_eq!(extended_end(end, 30), Some(at(22, 30, 0)));
        // Independent of wall clock by construction: only the stored
        // end participates.
        assert_eq!(extended_end(at(9, 15, 0), 45), Some(at(10, 0, 0)));
    }

    #[test]
    fn extend_rejects_unrepresentable_durations() {
        let end = at(22, 0, 0);
        assert_eq!(extended_end(end, i64::MAX), None);
        assert_eq!(extended_end(end, i64::MIN), None);
    }

    #[test]
    fn round_up_snaps_to_next_quarter_hour() {
        assert_eq!(round_up_to_slot(at(10, 0, 1)), at(10, 15, 0));
        assert_eq!(round_up_to_slot(at(10, 14, 59)), at(10, 15, 0));
        assert_eq!(round_up_to_slot(at(10, 16, 0)), at(10, 30, 0));
        assert_eq!(round_up_to_slot(at(10, 46, 0)), at(11, 0, 0));
    }

    #[test]
    fn round_up_keeps_exact_boundaries() {
        assert_eq!(round_up_to_slot(at(10, 0, 0)), at(10, 0, 0));
        assert_eq!(round_up_to_slot(at(10, 45, 0)), at(10, 45, 0));
    }
}
