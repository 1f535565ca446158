//! Read-side aggregation: day schedules and table availability.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Availability, Interval, ScheduleItem, TableId, availability, day_window, merge_items,
};
use crate::error::ApiError;
use crate::persistence::models::DiningTable;
use crate::persistence::{bookings, sessions, tables, venues};

/// One venue-day of merged timeline data.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    /// The UTC day window the items were fetched for.
    pub window: Interval,
    /// The venue's active tables, ordered by label.
    pub tables: Vec<DiningTable>,
    /// Bookings and sessions overlapping the window, in deterministic
    /// timeline order.
    pub items: Vec<ScheduleItem>,
}

/// Orchestration layer for schedule and availability reads.
#[derive(Debug, Clone)]
pub struct ScheduleService {
    pool: PgPool,
    max_unbooked_minutes: i64,
}

impl ScheduleService {
    /// Creates a new `ScheduleService`.
    #[must_use]
    pub fn new(pool: PgPool, max_unbooked_minutes: i64) -> Self {
        Self {
            pool,
            max_unbooked_minutes,
        }
    }

    /// Builds the merged schedule for one UTC day.
    ///
    /// `date` is a `YYYY-MM-DD` string; a missing or malformed value
    /// falls back to the current day. `table_ids` narrows the fetch to
    /// a subset of tables when given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue.
    pub async fn day_schedule(
        &self,
        slug: &str,
        date: Option<&str>,
        table_ids: Option<&[TableId]>,
        now: DateTime<Utc>,
    ) -> Result<DaySchedule, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;

        let window = day_window(date, now);
        let table_rows = tables::list_active(&self.pool, venue.id).await?;
        let day_bookings =
            bookings::overlapping_window(&self.pool, venue.id, window, table_ids).await?;
        let day_sessions =
            sessions::overlapping_window(&self.pool, venue.id, window, table_ids).await?;

        Ok(DaySchedule {
            window,
            tables: table_rows,
            items: merge_items(&day_bookings, &day_sessions, now),
        })
    }

    /// Reports a table's open minutes from `now` until its next
    /// upcoming booking.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue or table.
    pub async fn table_availability(
        &self,
        slug: &str,
        table_id: TableId,
        now: DateTime<Utc>,
    ) -> Result<Availability, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        let table = tables::find_active(&self.pool, venue.id, table_id)
            .await?
            .ok_or(ApiError::NotFound("table"))?;

        let next = bookings::next_start_after(&self.pool, venue.id, table.id, now).await?;
        Ok(availability(now, next, self.max_unbooked_minutes))
    }

    /// Lists the venue's active tables.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue.
    pub async fn list_tables(&self, slug: &str) -> Result<Vec<DiningTable>, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        Ok(tables::list_active(&self.pool, venue.id).await?)
    }
}
