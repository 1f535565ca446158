//! Schedule and availability DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ScheduleItem, SlotState, TableId};
use crate::persistence::models::DiningTable;

/// Query parameters for `GET /schedule`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ScheduleQuery {
    /// Venue slug.
    pub slug: String,
    /// UTC day as `YYYY-MM-DD`; missing or malformed falls back to
    /// today.
    #[serde(default)]
    pub date: Option<String>,
    /// Comma-separated table ids to restrict the fetch to.
    #[serde(default)]
    pub tables: Option<String>,
}

/// Query parameters for `GET /availability`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Venue slug.
    pub slug: String,
    /// Table to report on.
    pub table_id: TableId,
    /// Instant to measure from; defaults to the current time.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
}

/// An active table as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableDto {
    /// Table id.
    pub id: TableId,
    /// Display label.
    pub label: String,
    /// Occupancy of the current 15-minute slot; populated on the
    /// schedule response only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SlotState>,
}

impl From<DiningTable> for TableDto {
    fn from(t: DiningTable) -> Self {
        Self {
            id: t.id,
            label: t.label,
            state: None,
        }
    }
}

/// Item counts summarizing a fetched day.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleStats {
    /// Active tables returned.
    pub tables: usize,
    /// Booking entries on the timeline.
    pub bookings: usize,
    /// Session entries on the timeline.
    pub sessions: usize,
}

/// Response body for `GET /schedule`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    /// Start of the fetched UTC day window (inclusive).
    pub day_start: DateTime<Utc>,
    /// End of the fetched UTC day window (exclusive).
    pub day_end: DateTime<Utc>,
    /// The venue's active tables, ordered by label.
    pub tables: Vec<TableDto>,
    /// Merged timeline of bookings and sessions, time ascending.
    pub items: Vec<ScheduleItem>,
    /// Item counts for the fetched day.
    pub stats: ScheduleStats,
}
