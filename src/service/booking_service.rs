//! Booking orchestration: create, move, status transitions, delete.
//!
//! Every placement mutation follows the same pattern: resolve scope →
//! open a serializable transaction → fetch sibling windows → run the
//! domain conflict scan → write → commit. The database exclusion
//! constraint backs the scan; a constraint violation on commit is a
//! lost race, re-scanned to produce the same 409 a pre-check would.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Booking, BookingId, BookingStatus, Interval, TableId, VenueId, find_conflict, plan_transition,
};
use crate::error::ApiError;
use crate::persistence::{self, bookings, sessions, tables, venues};
use crate::service::AuthService;

/// Parameters for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    /// Target table; must be active in the venue.
    pub table_id: TableId,
    /// Requested half-open interval.
    pub interval: Interval,
    /// Optional party name shown on the schedule.
    pub party_name: Option<String>,
    /// Optional staff notes.
    pub notes: Option<String>,
    /// Optional client retry token; a repeat returns the original
    /// booking instead of a duplicate or a conflict error.
    pub idempotency_key: Option<String>,
}

/// Parameters for moving a booking to a new table and/or interval.
/// Omitted placement fields keep the booking's current values.
#[derive(Debug, Clone)]
pub struct MoveBooking {
    /// Booking to move.
    pub booking_id: BookingId,
    /// New table; `None` keeps the current one.
    pub table_id: Option<TableId>,
    /// New start; `None` keeps the current one.
    pub start_at: Option<DateTime<Utc>>,
    /// New end; `None` keeps the current one.
    pub end_at: Option<DateTime<Utc>>,
    /// Replacement party name.
    pub party_name: Option<String>,
    /// Replacement staff notes.
    pub notes: Option<String>,
}

/// Orchestration layer for booking operations.
#[derive(Debug, Clone)]
pub struct BookingService {
    pool: PgPool,
    auth: AuthService,
    strict_transitions: bool,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(pool: PgPool, auth: AuthService, strict_transitions: bool) -> Self {
        Self {
            pool,
            auth,
            strict_transitions,
        }
    }

    /// Creates a booking for the venue identified by `slug`.
    ///
    /// Checks run in a fixed order so a request failing several ways
    /// always reports the same error: venue, interval shape, past
    /// start, table, host PIN, then the conflict scan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a malformed or past
    /// interval, [`ApiError::NotFound`] for an unknown venue or table,
    /// [`ApiError::Unauthorized`] for a bad PIN, and
    /// [`ApiError::Overlap`] when a sibling blocks the interval.
    pub async fn create(
        &self,
        slug: &str,
        pin: Option<&str>,
        req: CreateBooking,
        now: DateTime<Utc>,
    ) -> Result<Booking, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        if !req.interval.is_well_formed() {
            return Err(ApiError::InvalidInput(
                "invalid interval: end must be after start".to_string(),
            ));
        }
        if req.interval.start < now {
            return Err(ApiError::InvalidInput(
                "start time must be in the future".to_string(),
            ));
        }
        let table = tables::find_active(&self.pool, venue.id, req.table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;
        self.auth.authorize_host(&venue, pin).await?;

        // A repeated submission with the same token returns the row the
        // first attempt created, whatever its current placement.
        if let Some(key) = req.idempotency_key.as_deref()
            && let Some(existing) = bookings::find_by_idempotency_key(&self.pool, venue.id, key).await?
        {
            return Ok(existing);
        }

        let mut tx = persistence::begin_serializable(&self.pool).await?;

        let booking_windows =
            bookings::windows_overlapping(&mut *tx, venue.id, table.id, req.interval).await?;
        let session_windows =
            sessions::windows_overlapping(&mut *tx, venue.id, table.id, req.interval)
                .await?;
        if let Some(conflict) =
            find_conflict(req.interval, &booking_windows, &session_windows, None, None)
        {
            return Err(ApiError::Overlap(conflict));
        }

        let new = bookings::NewBooking {
            venue_id: venue.id,
            table_id: table.id,
            interval: req.interval,
            party_name: req.party_name.clone(),
            notes: req.notes.clone(),
            idempotency_key: req.idempotency_key.clone(),
        };

        let inserted = match bookings::insert(&mut *tx, &new).await {
            Ok(b) => b,
            Err(err) => {
                drop(tx);
                return self.recover_race(err, venue.id, table.id, &req).await;
            }
        };
        if let Err(err) = tx.commit().await {
            return self.recover_race(err, venue.id, table.id, &req).await;
        }

        tracing::info!(booking_id = %inserted.id, table_id = %table.id, "booking created");
        Ok(inserted)
    }

    /// Moves a booking to a new table and/or interval. Placement
    /// fields left out of the request keep their current values; the
    /// checks run against the proposed final placement.
    ///
    /// The conflict scan excludes the booking itself, so shrinking or
    /// shifting within its own old window always succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`], [`ApiError::NotFound`],
    /// [`ApiError::Unauthorized`], or [`ApiError::Overlap`] as in
    /// [`BookingService::create`].
    pub async fn move_booking(
        &self,
        slug: &str,
        pin: Option<&str>,
        req: MoveBooking,
        now: DateTime<Utc>,
    ) -> Result<Booking, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        let current = bookings::find(&self.pool, venue.id, req.booking_id)
            .await?
            .ok_or(ApiError::NotFound("booking"))?;

        let interval = Interval::new(
            req.start_at.unwrap_or(current.start_at),
            req.end_at.unwrap_or(current.end_at),
        );
        if !interval.is_well_formed() {
            return Err(ApiError::InvalidInput(
                "invalid interval: end must be after start".to_string(),
            ));
        }
        if interval.start < now {
            return Err(ApiError::InvalidInput(
                "start time must be in the future".to_string(),
            ));
        }

        let target_table_id = req.table_id.unwrap_or(current.table_id);
        let table = tables::find_active(&self.pool, venue.id, target_table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;
        self.auth.authorize_host(&venue, pin).await?;

        let mut tx = persistence::begin_serializable(&self.pool).await?;

        let booking_windows =
            bookings::windows_overlapping(&mut *tx, venue.id, table.id, interval).await?;
        let session_windows =
            sessions::windows_overlapping(&mut *tx, venue.id, table.id, interval).await?;
        if let Some(conflict) = find_conflict(
            interval,
            &booking_windows,
            &session_windows,
            Some(current.id),
            None,
        ) {
            return Err(ApiError::Overlap(conflict));
        }

        let party_name = req.party_name.as_deref().or(current.party_name.as_deref());
        let notes = req.notes.as_deref().or(current.notes.as_deref());
        let updated = match bookings::update_placement(
            &mut *tx,
            current.id,
            table.id,
            interval,
            party_name,
            notes,
        )
        .await
        {
            Ok(b) => b,
            Err(err) => {
                drop(tx);
                return Err(self
                    .rescan_write_failure(err, venue.id, table.id, interval, Some(current.id))
                    .await);
            }
        };
        if let Err(err) = tx.commit().await {
            return Err(self
                .rescan_write_failure(err, venue.id, table.id, interval, Some(current.id))
                .await);
        }

        tracing::info!(booking_id = %updated.id, table_id = %table.id, "booking moved");
        Ok(updated)
    }

    /// Applies a status transition to a booking.
    ///
    /// ARRIVED, NO_SHOW, and CANCELLED stamp their timestamp on first
    /// entry only; corrections never overwrite an earlier stamp.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue or booking,
    /// [`ApiError::Unauthorized`] for a bad PIN, and
    /// [`ApiError::InvalidInput`] for a rejected transition.
    pub async fn set_status(
        &self,
        slug: &str,
        pin: Option<&str>,
        booking_id: BookingId,
        requested: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<Booking, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        self.auth.authorize_host(&venue, pin).await?;
        let current = bookings::find(&self.pool, venue.id, booking_id)
            .await?
            .ok_or(ApiError::NotFound("booking"))?;

        let change = plan_transition(current.status, requested, self.strict_transitions)
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let updated = bookings::apply_status(&self.pool, current.id, change, now).await?;
        tracing::info!(booking_id = %updated.id, status = updated.status.as_str(), "booking status changed");
        Ok(updated)
    }

    /// Deletes a booking outright, freeing its interval.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the venue or booking does
    /// not exist and [`ApiError::Unauthorized`] for a bad PIN.
    pub async fn delete(
        &self,
        slug: &str,
        pin: Option<&str>,
        booking_id: BookingId,
    ) -> Result<(), ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        self.auth.authorize_host(&venue, pin).await?;

        if !bookings::delete(&self.pool, venue.id, booking_id).await? {
            return Err(ApiError::NotFound("booking"));
        }

        tracing::info!(%booking_id, "booking deleted");
        Ok(())
    }

    /// Resolves a write failure that may be a lost concurrency race.
    ///
    /// When the exclusion constraint fired, a rival writer claimed the
    /// interval between our scan and our write. A duplicate idempotent
    /// submission racing against itself is not an error; its row is
    /// re-selected and returned. Any other constraint hit is re-scanned
    /// so the caller gets the same conflict shape a pre-check would
    /// have produced.
    async fn recover_race(
        &self,
        err: sqlx::Error,
        venue_id: VenueId,
        table_id: TableId,
        req: &CreateBooking,
    ) -> Result<Booking, ApiError> {
        if persistence::is_constraint_violation(&err)
            && let Some(key) = req.idempotency_key.as_deref()
            && let Some(existing) = bookings::find_by_idempotency_key(&self.pool, venue_id, key).await?
        {
            return Ok(existing);
        }

        Err(self
            .rescan_write_failure(err, venue_id, table_id, req.interval, None)
            .await)
    }

    /// Classifies a placement write failure after the pre-write scan
    /// passed. Non-constraint errors pass through as database errors;
    /// a constraint hit is re-scanned outside the failed transaction
    /// so the caller gets the same conflict shape the pre-check would
    /// have produced.
    async fn rescan_write_failure(
        &self,
        err: sqlx::Error,
        venue_id: VenueId,
        table_id: TableId,
        interval: Interval,
        exclude: Option<BookingId>,
    ) -> ApiError {
        if !persistence::is_constraint_violation(&err) {
            return ApiError::Database(err);
        }

        let booking_windows =
            match bookings::windows_overlapping(&self.pool, venue_id, table_id, interval).await {
                Ok(windows) => windows,
                Err(scan_err) => return ApiError::Database(scan_err),
            };
        let session_windows =
            match sessions::windows_overlapping(&self.pool, venue_id, table_id, interval).await {
                Ok(windows) => windows,
                Err(scan_err) => return ApiError::Database(scan_err),
            };
        match find_conflict(interval, &booking_windows, &session_windows, exclude, None) {
            Some(conflict) => ApiError::Overlap(conflict),
            // The rival row is already gone again; tell the caller to
            // retry rather than fabricate a conflict id.
            None => ApiError::Internal(
                "interval constraint rejected the write".to_string(),
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::auth::{InMemoryAttemptStore, RateLimiter};

    fn lazy_service() -> BookingService {
        let pool = match PgPool::connect_lazy("postgres://localhost/unreachable") {
            Ok(pool) => pool,
            Err(err) => panic!("lazy pool construction failed: {err}"),
        };
        let limiter = Arc::new(RateLimiter::new(
            InMemoryAttemptStore::new(),
            8,
            Duration::from_secs(60),
        ));
        let auth = AuthService::new(pool.clone(), limiter, true, Duration::ZERO);
        BookingService::new(pool, auth, false)
    }

    #[tokio::test]
    async fn non_constraint_write_failures_stay_database_errors() {
        let service = lazy_service();
        let start = match Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        };
        let interval = Interval::new(start, start + chrono::Duration::minutes(90));

        // A failure that is not a constraint hit must not be rewritten
        // into a conflict; it surfaces as-is without any re-scan.
        let err = service
            .rescan_write_failure(
                sqlx::Error::RowNotFound,
                VenueId::new(),
                TableId::new(),
                interval,
                None,
            )
            .await;
        assert!(matches!(err, ApiError::Database(_)));
    }
}
