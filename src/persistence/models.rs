//! Storage models for entities outside the scheduling core.
//!
//! Bookings and sessions decode straight into their domain structs;
//! these row types cover the ownership/identity entities.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{DeviceId, ScoreId, TableId, VenueId};

/// A venue row from the `venues` table.
#[derive(Debug, Clone)]
pub struct Venue {
    /// Venue identity.
    pub id: VenueId,
    /// Unique human-readable slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// bcrypt hash of the venue admin PIN, when configured.
    pub admin_pin_hash: Option<String>,
}

/// A table row from the `dining_tables` table.
#[derive(Debug, Clone)]
pub struct DiningTable {
    /// Table identity.
    pub id: TableId,
    /// Owning venue.
    pub venue_id: VenueId,
    /// Display label (e.g. `"Table 1"`).
    pub label: String,
    /// Inactive tables are hidden from scheduling and listings.
    pub active: bool,
    /// bcrypt hash of the table's host PIN, when configured.
    pub pin_hash: Option<String>,
}

/// A claimed device row from the `devices` table.
#[derive(Debug, Clone)]
pub struct Device {
    /// Device identity (internal).
    pub id: DeviceId,
    /// Venue the device is claimed for.
    pub venue_id: VenueId,
    /// Table the device is bound to, when any.
    pub table_id: Option<TableId>,
    /// Caller-supplied external device identifier.
    pub external_id: String,
    /// Opaque key issued at claim time; authenticates all device calls.
    pub device_key: String,
    /// Device status (`active` after a claim).
    pub status: String,
    /// Last reported battery percentage.
    pub battery_pct: Option<i32>,
    /// When the device was (last) claimed.
    pub claimed_at: DateTime<Utc>,
    /// Last heartbeat instant.
    pub last_seen_at: DateTime<Utc>,
}

/// A leaderboard entry from the `scores` table. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct Score {
    /// Score identity.
    pub id: ScoreId,
    /// Owning venue.
    pub venue_id: VenueId,
    /// Table the score was recorded at, when table-scoped.
    pub table_id: Option<TableId>,
    /// Player display name.
    pub player_name: String,
    /// Game identifier.
    pub game: String,
    /// Points scored.
    pub points: i32,
    /// Row creation instant; ties on points break oldest-first.
    pub created_at: DateTime<Utc>,
}
