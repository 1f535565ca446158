//! Booking DTOs for create, move, status, and delete operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::booking::derive_tag;
use crate::domain::{Booking, BookingId, BookingStatus, BookingTag, TableId};

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Venue slug.
    pub slug: String,
    /// Target table id.
    pub table_id: TableId,
    /// Reservation start (inclusive).
    pub start_at: DateTime<Utc>,
    /// Reservation end (exclusive).
    pub end_at: DateTime<Utc>,
    /// Party name shown on the schedule.
    #[serde(default)]
    pub party_name: Option<String>,
    /// Staff notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Client retry token; resubmitting with the same token returns
    /// the originally created booking.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Request body for `POST /bookings/move`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveBookingRequest {
    /// Venue slug.
    pub slug: String,
    /// Booking to move.
    pub booking_id: BookingId,
    /// New table; omit to keep the current one.
    #[serde(default)]
    pub table_id: Option<TableId>,
    /// New start (inclusive); omit to keep the current one.
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    /// New end (exclusive); omit to keep the current one.
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    /// Replacement party name; omit to keep.
    #[serde(default)]
    pub party_name: Option<String>,
    /// Replacement notes; omit to keep.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for `POST /bookings/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingStatusRequest {
    /// Venue slug.
    pub slug: String,
    /// Booking to transition.
    pub booking_id: BookingId,
    /// Requested status: `ARRIVED`, `NO_SHOW`, `CANCELLED`, or
    /// `COMPLETED`.
    pub status: String,
}

/// Venue scope for operations addressed by path id.
#[derive(Debug, Deserialize, IntoParams)]
pub struct VenueScope {
    /// Venue slug.
    pub slug: String,
}

/// A booking as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    /// Booking id.
    pub id: BookingId,
    /// Reserved table.
    pub table_id: TableId,
    /// Reservation start (inclusive).
    pub start_at: DateTime<Utc>,
    /// Reservation end (exclusive).
    pub end_at: DateTime<Utc>,
    /// Party name.
    pub party_name: Option<String>,
    /// Staff notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Derived display tag, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<BookingTag>,
    /// When the party arrived, if ever.
    pub arrived_at: Option<DateTime<Utc>>,
    /// When the booking was marked a no-show, if ever.
    pub no_show_at: Option<DateTime<Utc>>,
    /// When the booking was cancelled, if ever.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl BookingDto {
    /// Projects a booking into its response shape, deriving the
    /// display tag against `now`.
    #[must_use]
    pub fn from_booking(b: Booking, now: DateTime<Utc>) -> Self {
        let tag = derive_tag(b.status, b.interval(), now);
        Self {
            id: b.id,
            table_id: b.table_id,
            start_at: b.start_at,
            end_at: b.end_at,
            party_name: b.party_name,
            notes: b.notes,
            status: b.status,
            tag,
            arrived_at: b.arrived_at,
            no_show_at: b.no_show_at,
            cancelled_at: b.cancelled_at,
            created_at: b.created_at,
        }
    }
}
