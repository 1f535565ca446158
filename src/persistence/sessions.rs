//! Session queries.
//!
//! A partial unique index (`table_id` where `status = 'running'`)
//! enforces at most one running session per table at the storage
//! level; lookups still order by start and take the most recent row,
//! tolerating historical data written before the index existed.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::conflict::SessionWindow;
use crate::domain::{DeviceId, Interval, Session, SessionId, SessionStatus, TableId, VenueId};

type SessionRow = (
    Uuid,
    Uuid,
    Uuid,
    Option<Uuid>,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    DateTime<Utc>,
);

const SESSION_COLUMNS: &str =
    "id, venue_id, table_id, device_id, starts_at, ends_at, status, created_at";

fn parse_status(s: &str) -> Result<SessionStatus, sqlx::Error> {
    SessionStatus::parse(s)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown session status: {s}").into()))
}

fn from_row(row: SessionRow) -> Result<Session, sqlx::Error> {
    let (id, venue_id, table_id, device_id, starts_at, ends_at, status, created_at) = row;
    Ok(Session {
        id: SessionId::from_uuid(id),
        venue_id: VenueId::from_uuid(venue_id),
        table_id: TableId::from_uuid(table_id),
        device_id: device_id.map(DeviceId::from_uuid),
        starts_at,
        ends_at,
        status: parse_status(&status)?,
        created_at,
    })
}

/// Fields of a session about to be inserted.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Owning venue.
    pub venue_id: VenueId,
    /// Occupied table.
    pub table_id: TableId,
    /// Starting device, when device-initiated.
    pub device_id: Option<DeviceId>,
    /// Occupancy interval.
    pub interval: Interval,
}

/// Fetches the sibling session windows overlapping `interval` on one
/// table, for the domain conflict scan.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn windows_overlapping(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: TableId,
    interval: Interval,
) -> Result<Vec<SessionWindow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String)>(
        "SELECT id, starts_at, ends_at, status FROM sessions \
         WHERE venue_id = $1 AND table_id = $2 AND starts_at < $3 AND ends_at > $4",
    )
    .bind(venue_id.as_uuid())
    .bind(table_id.as_uuid())
    .bind(interval.end)
    .bind(interval.start)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|(id, start, end, status)| {
            Ok(SessionWindow {
                id: SessionId::from_uuid(id),
                interval: Interval::new(start, end),
                status: parse_status(&status)?,
            })
        })
        .collect()
}

/// Inserts a session with status running.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure, including the
/// single-running-session unique violation when a concurrent start won.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    new: &NewSession,
) -> Result<Session, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "INSERT INTO sessions (venue_id, table_id, device_id, starts_at, ends_at, status) \
         VALUES ($1, $2, $3, $4, $5, 'running') \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(new.venue_id.as_uuid())
    .bind(new.table_id.as_uuid())
    .bind(new.device_id.map(|d| *d.as_uuid()))
    .bind(new.interval.start)
    .bind(new.interval.end)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Fetches a session owned by the venue.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    session_id: SessionId,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND venue_id = $2"
    ))
    .bind(session_id.as_uuid())
    .bind(venue_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// Rewrites a session's table and interval (host move).
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn update_placement(
    executor: impl PgExecutor<'_>,
    session_id: SessionId,
    table_id: TableId,
    interval: Interval,
) -> Result<Session, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "UPDATE sessions SET table_id = $2, starts_at = $3, ends_at = $4 WHERE id = $1 \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(session_id.as_uuid())
    .bind(table_id.as_uuid())
    .bind(interval.start)
    .bind(interval.end)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Stops a session: status becomes stopped and the end instant is set
/// to `ends_at` (which may be earlier than the scheduled end).
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn stop(
    executor: impl PgExecutor<'_>,
    session_id: SessionId,
    ends_at: DateTime<Utc>,
) -> Result<Session, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "UPDATE sessions SET status = 'stopped', ends_at = $2 WHERE id = $1 \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(session_id.as_uuid())
    .bind(ends_at)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Stops the device's running session, if one exists.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn stop_running_for_device(
    executor: impl PgExecutor<'_>,
    device_id: DeviceId,
    ends_at: DateTime<Utc>,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "UPDATE sessions SET status = 'stopped', ends_at = $2 \
         WHERE device_id = $1 AND status = 'running' \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(device_id.as_uuid())
    .bind(ends_at)
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// Rewrites a session's scheduled end (extension from its current end).
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn extend(
    executor: impl PgExecutor<'_>,
    session_id: SessionId,
    new_end: DateTime<Utc>,
) -> Result<Session, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "UPDATE sessions SET ends_at = $2 WHERE id = $1 RETURNING {SESSION_COLUMNS}"
    ))
    .bind(session_id.as_uuid())
    .bind(new_end)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Most recent running session for a table, or none.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn current_for_table(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: TableId,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions \
         WHERE venue_id = $1 AND table_id = $2 AND status = 'running' \
         ORDER BY starts_at DESC LIMIT 1"
    ))
    .bind(venue_id.as_uuid())
    .bind(table_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// Most recent running session started by a device, for polling.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn current_for_device(
    executor: impl PgExecutor<'_>,
    device_id: DeviceId,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions \
         WHERE device_id = $1 AND status = 'running' \
         ORDER BY starts_at DESC LIMIT 1"
    ))
    .bind(device_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// All sessions overlapping a window for the venue, optionally
/// narrowed to a set of tables. Feeds the schedule aggregator.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn overlapping_window(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    window: Interval,
    table_ids: Option<&[TableId]>,
) -> Result<Vec<Session>, sqlx::Error> {
    let table_uuids: Option<Vec<Uuid>> =
        table_ids.map(|ids| ids.iter().map(|t| *t.as_uuid()).collect());

    let rows = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions \
         WHERE venue_id = $1 AND starts_at < $2 AND ends_at > $3 \
         AND ($4::uuid[] IS NULL OR table_id = ANY($4)) \
         ORDER BY starts_at ASC"
    ))
    .bind(venue_id.as_uuid())
    .bind(window.end)
    .bind(window.start)
    .bind(table_uuids)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(from_row).collect()
}
