//! Table queries. Always scoped by `(venue_id, table_id)` together —
//! a bare table id must never resolve across venues.

use sqlx::PgExecutor;
use uuid::Uuid;

use super::models::DiningTable;
use crate::domain::{TableId, VenueId};

fn from_row(row: (Uuid, Uuid, String, bool, Option<String>)) -> DiningTable {
    let (id, venue_id, label, active, pin_hash) = row;
    DiningTable {
        id: TableId::from_uuid(id),
        venue_id: VenueId::from_uuid(venue_id),
        label,
        active,
        pin_hash,
    }
}

/// Finds an active table belonging to the venue.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find_active(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: TableId,
) -> Result<Option<DiningTable>, sqlx::Error> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, String, bool, Option<String>)>(
        "SELECT id, venue_id, label, active, pin_hash FROM dining_tables \
         WHERE id = $1 AND venue_id = $2 AND active",
    )
    .bind(table_id.as_uuid())
    .bind(venue_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    Ok(row.map(from_row))
}

/// Lists the venue's active tables ordered by label.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn list_active(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
) -> Result<Vec<DiningTable>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, String, bool, Option<String>)>(
        "SELECT id, venue_id, label, active, pin_hash FROM dining_tables \
         WHERE venue_id = $1 AND active ORDER BY label ASC",
    )
    .bind(venue_id.as_uuid())
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(from_row).collect())
}

/// Returns the configured PIN hashes of the venue's active tables.
/// Used by host authorization ("PIN matches any active table").
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn active_pin_hashes(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT pin_hash FROM dining_tables \
         WHERE venue_id = $1 AND active AND pin_hash IS NOT NULL",
    )
    .bind(venue_id.as_uuid())
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|(hash,)| hash).collect())
}
