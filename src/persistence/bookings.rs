//! Booking queries.
//!
//! Interval filters use the half-open overlap condition
//! (`start_at < $end AND end_at > $start`), matching
//! [`crate::domain::Interval::overlaps`]. Status filtering stays in the
//! domain's conflict scan; the SQL only narrows rows by interval.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::domain::booking::{StampField, StatusChange};
use crate::domain::conflict::BookingWindow;
use crate::domain::{Booking, BookingId, BookingStatus, Interval, TableId, VenueId};

type BookingRow = (
    Uuid,
    Uuid,
    Uuid,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<String>,
    Option<String>,
    String,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

const BOOKING_COLUMNS: &str = "id, venue_id, table_id, start_at, end_at, party_name, notes, \
     status, arrived_at, no_show_at, cancelled_at, created_at";

fn parse_status(s: &str) -> Result<BookingStatus, sqlx::Error> {
    BookingStatus::parse(s)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown booking status: {s}").into()))
}

fn from_row(row: BookingRow) -> Result<Booking, sqlx::Error> {
    let (
        id,
        venue_id,
        table_id,
        start_at,
        end_at,
        party_name,
        notes,
        status,
        arrived_at,
        no_show_at,
        cancelled_at,
        created_at,
    ) = row;
    Ok(Booking {
        id: BookingId::from_uuid(id),
        venue_id: VenueId::from_uuid(venue_id),
        table_id: TableId::from_uuid(table_id),
        start_at,
        end_at,
        party_name,
        notes,
        status: parse_status(&status)?,
        arrived_at,
        no_show_at,
        cancelled_at,
        created_at,
    })
}

/// Fields of a booking about to be inserted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Owning venue.
    pub venue_id: VenueId,
    /// Reserved table.
    pub table_id: TableId,
    /// Reserved interval.
    pub interval: Interval,
    /// Optional party name.
    pub party_name: Option<String>,
    /// Optional staff notes.
    pub notes: Option<String>,
    /// Optional client retry token; repeats return the original row.
    pub idempotency_key: Option<String>,
}

/// Fetches the sibling booking windows overlapping `interval` on one
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
) -> Result<Vec<BookingWindow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String)>(
        "SELECT id, start_at, end_at, status FROM bookings \
         WHERE venue_id = $1 AND table_id = $2 AND start_at < $3 AND end_at > $4",
    )
    .bind(venue_id.as_uuid())
    .bind(table_id.as_uuid())
    .bind(interval.end)
    .bind(interval.start)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|(id, start, end, status)| {
            Ok(BookingWindow {
                id: BookingId::from_uuid(id),
                interval: Interval::new(start, end),
                status: parse_status(&status)?,
            })
        })
        .collect()
}

/// Inserts a booking with status ACTIVE and returns the full record.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure, including constraint
/// violations when a concurrent writer took the interval first.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    new: &NewBooking,
) -> Result<Booking, sqlx::Error> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "INSERT INTO bookings \
         (venue_id, table_id, start_at, end_at, party_name, notes, status, idempotency_key) \
         VALUES ($1, $2, $3, $4, $5, $6, 'ACTIVE', $7) \
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(new.venue_id.as_uuid())
    .bind(new.table_id.as_uuid())
    .bind(new.interval.start)
    .bind(new.interval.end)
    .bind(new.party_name.as_deref())
    .bind(new.notes.as_deref())
    .bind(new.idempotency_key.as_deref())
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Fetches a booking owned by the venue.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    booking_id: BookingId,
) -> Result<Option<Booking>, sqlx::Error> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND venue_id = $2"
    ))
    .bind(booking_id.as_uuid())
    .bind(venue_id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// Fetches a previously created booking by its idempotency key.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find_by_idempotency_key(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    key: &str,
) -> Result<Option<Booking>, sqlx::Error> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE venue_id = $1 AND idempotency_key = $2"
    ))
    .bind(venue_id.as_uuid())
    .bind(key)
    .fetch_optional(executor)
    .await?;

    row.map(from_row).transpose()
}

/// Rewrites a booking's table, interval, and descriptive fields.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure, including constraint
/// violations when the move lost a race.
pub async fn update_placement(
    executor: impl PgExecutor<'_>,
    booking_id: BookingId,
    table_id: TableId,
    interval: Interval,
    party_name: Option<&str>,
    notes: Option<&str>,
) -> Result<Booking, sqlx::Error> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings SET table_id = $2, start_at = $3, end_at = $4, \
         party_name = $5, notes = $6 WHERE id = $1 \
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking_id.as_uuid())
    .bind(table_id.as_uuid())
    .bind(interval.start)
    .bind(interval.end)
    .bind(party_name)
    .bind(notes)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Applies a planned status change, stamping the matching timestamp
/// exactly once (a previously set timestamp is never overwritten or
/// cleared).
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn apply_status(
    executor: impl PgExecutor<'_>,
    booking_id: BookingId,
    change: StatusChange,
    now: DateTime<Utc>,
) -> Result<Booking, sqlx::Error> {
    let stamp_arrived = change.stamp == Some(StampField::ArrivedAt);
    let stamp_no_show = change.stamp == Some(StampField::NoShowAt);
    let stamp_cancelled = change.stamp == Some(StampField::CancelledAt);

    let row = sqlx::query_as::<_, BookingRow>(&format!(
        "UPDATE bookings SET status = $2, \
         arrived_at = CASE WHEN $3 THEN COALESCE(arrived_at, $6) ELSE arrived_at END, \
         no_show_at = CASE WHEN $4 THEN COALESCE(no_show_at, $6) ELSE no_show_at END, \
         cancelled_at = CASE WHEN $5 THEN COALESCE(cancelled_at, $6) ELSE cancelled_at END \
         WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(booking_id.as_uuid())
    .bind(change.status.as_str())
    .bind(stamp_arrived)
    .bind(stamp_no_show)
    .bind(stamp_cancelled)
    .bind(now)
    .fetch_one(executor)
    .await?;

    from_row(row)
}

/// Hard-deletes a booking owned by the venue. Returns whether a row
/// was removed.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn delete(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    booking_id: BookingId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1 AND venue_id = $2")
        .bind(booking_id.as_uuid())
        .bind(venue_id.as_uuid())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Earliest non-cancelled booking start strictly after `from` on the
/// table, for the availability calculator.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn next_start_after(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: TableId,
    from: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let row = sqlx::query_as::<_, (DateTime<Utc>,)>(
        "SELECT start_at FROM bookings \
         WHERE venue_id = $1 AND table_id = $2 AND start_at > $3 AND status <> 'CANCELLED' \
         ORDER BY start_at ASC LIMIT 1",
    )
    .bind(venue_id.as_uuid())
    .bind(table_id.as_uuid())
    .bind(from)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(start,)| start))
}

/// All bookings overlapping a window for the venue, optionally
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
) -> Result<Vec<Booking>, sqlx::Error> {
    let table_uuids: Option<Vec<Uuid>> =
        table_ids.map(|ids| ids.iter().map(|t| *t.as_uuid()).collect());

    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings \
         WHERE venue_id = $1 AND start_at < $2 AND end_at > $3 \
         AND ($4::uuid[] IS NULL OR table_id = ANY($4)) \
         ORDER BY start_at ASC"
    ))
    .bind(venue_id.as_uuid())
    .bind(window.end)
    .bind(window.start)
    .bind(table_uuids)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(from_row).collect()
}
