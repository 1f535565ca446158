//! Session DTOs for start, update, end, and extend operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookingId, DeviceId, Session, SessionId, SessionStatus, TableId};

/// Request body for `POST /sessions` (host start).
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Venue slug.
    pub slug: String,
    /// Table to occupy.
    pub table_id: TableId,
    /// Occupancy start.
    pub starts_at: DateTime<Utc>,
    /// Occupancy end.
    pub ends_at: DateTime<Utc>,
    /// Booking being seated, when the walk-up has one.
    #[serde(default)]
    pub booking_id: Option<BookingId>,
}

/// Request body for `POST /sessions/update`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSessionRequest {
    /// Venue slug.
    pub slug: String,
    /// Session to update.
    pub session_id: SessionId,
    /// New table; omit to keep the current one.
    #[serde(default)]
    pub table_id: Option<TableId>,
    /// New window start.
    pub starts_at: DateTime<Utc>,
    /// New window end.
    pub ends_at: DateTime<Utc>,
}

/// Request body for `POST /sessions/end`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EndSessionRequest {
    /// Venue slug.
    pub slug: String,
    /// Session to end.
    pub session_id: SessionId,
    /// Close instant; omit to end at the current time.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /sessions/extend`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtendSessionRequest {
    /// Venue slug.
    pub slug: String,
    /// Session to extend.
    pub session_id: SessionId,
    /// Minutes to add to the current end.
    pub minutes: i64,
}

/// Request body for `POST /device/sessions/start`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeviceStartSessionRequest {
    /// Requested duration in minutes; clamped, defaults to 60.
    #[serde(default)]
    pub minutes: Option<i64>,
}

/// A session as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDto {
    /// Session id.
    pub id: SessionId,
    /// Occupied table.
    pub table_id: TableId,
    /// Starting device, when device-initiated.
    pub device_id: Option<DeviceId>,
    /// Occupancy start.
    pub starts_at: DateTime<Utc>,
    /// Occupancy end (scheduled, or actual once stopped).
    pub ends_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: SessionStatus,
}

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            table_id: s.table_id,
            device_id: s.device_id,
            starts_at: s.starts_at,
            ends_at: s.ends_at,
            status: s.status,
        }
    }
}
