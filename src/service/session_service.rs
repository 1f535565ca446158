//! Session orchestration: host start, device start/stop, extend.
//!
//! Mirrors the booking paths: serializable transaction, domain
//! conflict scan, write, commit. The one-running-session-per-table
//! rule is additionally enforced by a partial unique index, so a
//! constraint violation on insert means a rival start won the race.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::domain::{
    BookingId, DeviceId, Interval, Session, SessionId, SessionStatus, TableId, VenueId,
    clamp_minutes, extended_end, find_conflict,
};
use crate::error::ApiError;
use crate::persistence::models::Device;
use crate::persistence::{self, bookings, sessions, tables, venues};
use crate::service::AuthService;

/// Parameters for a host-initiated session start.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// Table to occupy.
    pub table_id: TableId,
    /// Explicit occupancy window chosen by the host.
    pub interval: Interval,
    /// Booking being seated, when the walk-up has one. Its own
    /// reserved interval is excluded from the conflict scan so seating
    /// a party into their reservation never self-collides.
    pub booking_id: Option<BookingId>,
}

/// Orchestration layer for session operations.
#[derive(Debug, Clone)]
pub struct SessionService {
    pool: PgPool,
    auth: AuthService,
}

impl SessionService {
    /// Creates a new `SessionService`.
    #[must_use]
    pub fn new(pool: PgPool, auth: AuthService) -> Self {
        Self { pool, auth }
    }

    /// Starts a session from the host view over an explicit window.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a malformed interval,
    /// [`ApiError::NotFound`] for an unknown venue or table,
    /// [`ApiError::Unauthorized`] for a bad PIN,
    /// [`ApiError::SessionAlreadyRunning`] when the table is occupied,
    /// and [`ApiError::Overlap`] when a booking blocks the window.
    pub async fn start_for_host(
        &self,
        slug: &str,
        pin: Option<&str>,
        req: StartSession,
    ) -> Result<Session, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        if !req.interval.is_well_formed() {
            return Err(ApiError::InvalidInput(
                "invalid interval: end must be after start".to_string(),
            ));
        }
        let table = tables::find_active(&self.pool, venue.id, req.table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;
        self.auth.authorize_host(&venue, pin).await?;

        self.start(venue.id, table.id, None, req.interval, req.booking_id)
            .await
    }

    /// Starts a session on behalf of a claimed device.
    ///
    /// Any session the device was already running is stopped first, so
    /// a device that moved tables or lost its stop request does not
    /// leave a phantom occupancy behind.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] when the device is not bound
    /// to a table, plus the same errors as
    /// [`SessionService::start_for_host`].
    pub async fn start_for_device(
        &self,
        device: &Device,
        minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Session, ApiError> {
        let table_id = device
            .table_id
            .ok_or_else(|| ApiError::InvalidInput("device is not bound to a table".to_string()))?;
        let table = tables::find_active(&self.pool, device.venue_id, table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;

        if let Some(stale) = sessions::stop_running_for_device(&self.pool, device.id, now).await? {
            tracing::info!(session_id = %stale.id, device_id = %device.id, "stale device session stopped");
        }

        let interval = Interval::new(now, now + Duration::minutes(clamp_minutes(minutes)));
        self.start(device.venue_id, table.id, Some(device.id), interval, None)
            .await
    }

    async fn start(
        &self,
        venue_id: VenueId,
        table_id: TableId,
        device_id: Option<DeviceId>,
        interval: Interval,
        seated_booking: Option<BookingId>,
    ) -> Result<Session, ApiError> {
        if sessions::current_for_table(&self.pool, venue_id, table_id)
            .await?
            .is_some()
        {
            return Err(ApiError::SessionAlreadyRunning);
        }

        let mut tx = persistence::begin_serializable(&self.pool).await?;

        let booking_windows =
            bookings::windows_overlapping(&mut *tx, venue_id, table_id, interval).await?;
        let session_windows =
            sessions::windows_overlapping(&mut *tx, venue_id, table_id, interval).await?;
        if let Some(conflict) = find_conflict(
            interval,
            &booking_windows,
            &session_windows,
            seated_booking,
            None,
        ) {
            return Err(ApiError::Overlap(conflict));
        }

        let new = sessions::NewSession {
            venue_id,
            table_id,
            device_id,
            interval,
        };
        let inserted = match sessions::insert(&mut *tx, &new).await {
            Ok(s) => s,
            Err(err) if persistence::is_constraint_violation(&err) => {
                return Err(ApiError::SessionAlreadyRunning);
            }
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = tx.commit().await {
            if persistence::is_constraint_violation(&err) {
                return Err(ApiError::SessionAlreadyRunning);
            }
            return Err(err.into());
        }

        tracing::info!(session_id = %inserted.id, %table_id, "session started");
        Ok(inserted)
    }

    /// Moves a running session to another table and/or window.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`], [`ApiError::Unauthorized`] for
    /// a bad PIN, [`ApiError::NoRunningSession`] for a stopped
    /// session, [`ApiError::InvalidInput`] for a malformed or past
    /// interval, [`ApiError::SessionAlreadyRunning`] when another
    /// session holds the target table, or [`ApiError::Overlap`].
    pub async fn update(
        &self,
        slug: &str,
        pin: Option<&str>,
        session_id: SessionId,
        table_id: Option<TableId>,
        interval: Interval,
        now: DateTime<Utc>,
    ) -> Result<Session, ApiError> {
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

        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        let current = sessions::find(&self.pool, venue.id, session_id)
            .await?
            .ok_or(ApiError::NotFound("session"))?;
        if current.status != SessionStatus::Running {
            return Err(ApiError::NoRunningSession);
        }

        let target_table_id = table_id.unwrap_or(current.table_id);
        let table = tables::find_active(&self.pool, venue.id, target_table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;
        self.auth.authorize_host(&venue, pin).await?;

        // Moving onto a table with its own running session would be
        // rejected by the one-running-per-table index even when the
        // windows don't overlap, so check occupancy up front.
        let running = sessions::current_for_table(&self.pool, venue.id, table.id).await?;
        if occupied_by_other(running.as_ref(), current.id) {
            return Err(ApiError::SessionAlreadyRunning);
        }

        let mut tx = persistence::begin_serializable(&self.pool).await?;

        let booking_windows =
            bookings::windows_overlapping(&mut *tx, venue.id, table.id, interval).await?;
        let session_windows =
            sessions::windows_overlapping(&mut *tx, venue.id, table.id, interval).await?;
        if let Some(conflict) = find_conflict(
            interval,
            &booking_windows,
            &session_windows,
            None,
            Some(current.id),
        ) {
            return Err(ApiError::Overlap(conflict));
        }

        let updated = match sessions::update_placement(&mut *tx, current.id, table.id, interval)
            .await
        {
            Ok(session) => session,
            Err(err) if persistence::is_constraint_violation(&err) => {
                return Err(ApiError::SessionAlreadyRunning);
            }
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = tx.commit().await {
            if persistence::is_constraint_violation(&err) {
                return Err(ApiError::SessionAlreadyRunning);
            }
            return Err(err.into());
        }

        tracing::info!(session_id = %updated.id, table_id = %table.id, "session updated");
        Ok(updated)
    }

    /// Ends a session, truncating its window at `ends_at` (the host
    /// may backdate or forward-date the close; callers default it to
    /// the current time).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue or session,
    /// [`ApiError::Unauthorized`] for a bad PIN, and
    /// [`ApiError::NoRunningSession`] if it is already stopped.
    pub async fn end(
        &self,
        slug: &str,
        pin: Option<&str>,
        session_id: SessionId,
        ends_at: DateTime<Utc>,
    ) -> Result<Session, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        self.auth.authorize_host(&venue, pin).await?;
        let current = sessions::find(&self.pool, venue.id, session_id)
            .await?
            .ok_or(ApiError::NotFound("session"))?;
        if current.status != SessionStatus::Running {
            return Err(ApiError::NoRunningSession);
        }

        let stopped = sessions::stop(&self.pool, current.id, ends_at).await?;
        tracing::info!(session_id = %stopped.id, "session ended");
        Ok(stopped)
    }

    /// Ends whatever session the device is running.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoRunningSession`] when the device has none.
    pub async fn end_for_device(
        &self,
        device: &Device,
        now: DateTime<Utc>,
    ) -> Result<Session, ApiError> {
        let stopped = sessions::stop_running_for_device(&self.pool, device.id, now)
            .await?
            .ok_or(ApiError::NoRunningSession)?;
        tracing::info!(session_id = %stopped.id, device_id = %device.id, "device session ended");
        Ok(stopped)
    }

    /// Extends a running session's end by the given minutes.
    ///
    /// The extension grows from the current end, not from `now`, so
    /// repeated extensions accumulate. Only the newly claimed tail is
    /// scanned for conflicts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`], [`ApiError::NoRunningSession`],
    /// [`ApiError::InvalidInput`] for non-positive or unrepresentable
    /// minutes, or [`ApiError::Overlap`].
    pub async fn extend(
        &self,
        slug: &str,
        session_id: SessionId,
        minutes: i64,
    ) -> Result<Session, ApiError> {
        if minutes <= 0 {
            return Err(ApiError::InvalidInput(
                "extension minutes must be positive".to_string(),
            ));
        }

        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        let current = sessions::find(&self.pool, venue.id, session_id)
            .await?
            .ok_or(ApiError::NotFound("session"))?;
        if current.status != SessionStatus::Running {
            return Err(ApiError::NoRunningSession);
        }

        let new_end = extended_end(current.ends_at, minutes).ok_or_else(|| {
            ApiError::InvalidInput("extension minutes out of range".to_string())
        })?;
        let tail = Interval::new(current.ends_at, new_end);

        let mut tx = persistence::begin_serializable(&self.pool).await?;

        let booking_windows =
            bookings::windows_overlapping(&mut *tx, venue.id, current.table_id, tail).await?;
        let session_windows =
            sessions::windows_overlapping(&mut *tx, venue.id, current.table_id, tail).await?;
        if let Some(conflict) = find_conflict(
            tail,
            &booking_windows,
            &session_windows,
            None,
            Some(current.id),
        ) {
            return Err(ApiError::Overlap(conflict));
        }

        let extended = sessions::extend(&mut *tx, current.id, new_end).await?;
        tx.commit().await?;

        tracing::info!(session_id = %extended.id, %new_end, "session extended");
        Ok(extended)
    }

    /// The device's currently running session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on database failure.
    pub async fn current_for_device(&self, device: &Device) -> Result<Option<Session>, ApiError> {
        Ok(sessions::current_for_device(&self.pool, device.id).await?)
    }
}

/// Whether a table's running session belongs to someone other than the
/// session being placed there.
fn occupied_by_other(running: Option<&Session>, session_id: SessionId) -> bool {
    running.is_some_and(|session| session.id != session_id)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn session_at(hour: u32) -> Session {
        let start = match Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        };
        Session {
            id: SessionId::new(),
            venue_id: VenueId::new(),
            table_id: TableId::new(),
            device_id: None,
            starts_at: start,
            ends_at: start + Duration::minutes(60),
            status: SessionStatus::Running,
            created_at: start,
        }
    }

    #[test]
    fn moving_onto_a_table_held_by_another_session_is_occupied() {
        let holder = session_at(18);
        assert!(occupied_by_other(Some(&holder), SessionId::new()));
    }

    #[test]
    fn a_session_does_not_occupy_its_own_table() {
        let current = session_at(18);
        assert!(!occupied_by_other(Some(&current), current.id));
        assert!(!occupied_by_other(None, current.id));
    }
}
