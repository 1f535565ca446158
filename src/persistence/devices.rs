//! Device queries: claim, key lookup, heartbeat.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::models::Device;
use crate::domain::{DeviceId, TableId, VenueId};

type DeviceRow = (
    Uuid,
    Uuid,
    Option<Uuid>,
    String,
    String,
    String,
    Option<i32>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const DEVICE_COLUMNS: &str = "id, venue_id, table_id, external_id, device_key, status, \
     battery_pct, claimed_at, last_seen_at";

fn from_row(row: DeviceRow) -> Device {
    let (
        id,
        venue_id,
        table_id,
        external_id,
        device_key,
        status,
        battery_pct,
        claimed_at,
        last_seen_at,
    ) = row;
    Device {
        id: DeviceId::from_uuid(id),
        venue_id: VenueId::from_uuid(venue_id),
        table_id: table_id.map(TableId::from_uuid),
        external_id,
        device_key,
        status,
        battery_pct,
        claimed_at,
        last_seen_at,
    }
}

/// Claims (or re-claims) a device by its external id: binds it to the
/// venue and optional table, marks it active, and issues a fresh
/// opaque key. A re-claim rotates the key.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn upsert_claim(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    external_id: &str,
    table_id: Option<TableId>,
    now: DateTime<Utc>,
) -> Result<Device, sqlx::Error> {
    let key = Uuid::new_v4().to_string();
    let row = sqlx::query_as::<_, DeviceRow>(&format!(
        "INSERT INTO devices \
         (venue_id, table_id, external_id, device_key, status, claimed_at, last_seen_at) \
         VALUES ($1, $2, $3, $4, 'active', $5, $5) \
         ON CONFLICT (external_id) DO UPDATE SET \
         venue_id = EXCLUDED.venue_id, table_id = EXCLUDED.table_id, \
         device_key = EXCLUDED.device_key, status = 'active', \
         claimed_at = EXCLUDED.claimed_at, last_seen_at = EXCLUDED.last_seen_at \
         RETURNING {DEVICE_COLUMNS}"
    ))
    .bind(venue_id.as_uuid())
    .bind(table_id.map(|t| *t.as_uuid()))
    .bind(external_id)
    .bind(key)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(from_row(row))
}

/// Authenticates a device by its issued key.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find_by_key(
    executor: impl PgExecutor<'_>,
    device_key: &str,
) -> Result<Option<Device>, sqlx::Error> {
    let row = sqlx::query_as::<_, DeviceRow>(&format!(
        "SELECT {DEVICE_COLUMNS} FROM devices WHERE device_key = $1 AND status = 'active'"
    ))
    .bind(device_key)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(from_row))
}

/// Records a heartbeat: bumps `last_seen_at` and stores the battery
/// level when reported. Returns whether the device exists.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn heartbeat(
    executor: impl PgExecutor<'_>,
    device_id: DeviceId,
    battery_pct: Option<i32>,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE devices SET last_seen_at = $2, battery_pct = COALESCE($3, battery_pct) \
         WHERE id = $1",
    )
    .bind(device_id.as_uuid())
    .bind(now)
    .bind(battery_pct)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
