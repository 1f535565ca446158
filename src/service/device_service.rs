//! Device lifecycle: claiming, key authentication, heartbeats.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::TableId;
use crate::error::ApiError;
use crate::persistence::models::Device;
use crate::persistence::{devices, tables, venues};

/// Orchestration layer for device operations.
#[derive(Debug, Clone)]
pub struct DeviceService {
    pool: PgPool,
}

impl DeviceService {
    /// Creates a new `DeviceService`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claims a device into a venue, optionally binding it to a table.
    ///
    /// A re-claim of the same external id rebinds the device and
    /// rotates its key, invalidating whatever key it held before.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty external id and
    /// [`ApiError::NotFound`] for an unknown venue or table.
    pub async fn claim(
        &self,
        slug: &str,
        external_id: &str,
        table_id: Option<TableId>,
        now: DateTime<Utc>,
    ) -> Result<Device, ApiError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ApiError::InvalidInput(
                "external device id must not be empty".to_string(),
            ));
        }

        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;

        let bound_table = match table_id {
            Some(id) => Some(
                tables::find_active(&self.pool, venue.id, id)
                    .await?
                    .ok_or(ApiError::NotFound("table"))?
                    .id,
            ),
            None => None,
        };

        let device =
            devices::upsert_claim(&self.pool, venue.id, external_id, bound_table, now).await?;
        tracing::info!(device_id = %device.id, external_id, "device claimed");
        Ok(device)
    }

    /// Resolves a device from its issued key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for a missing or unknown key.
    pub async fn authenticate(&self, device_key: Option<&str>) -> Result<Device, ApiError> {
        let key = device_key.ok_or(ApiError::Unauthorized)?;
        devices::find_by_key(&self.pool, key)
            .await?
            .ok_or(ApiError::Unauthorized)
    }

    /// Records a heartbeat from an authenticated device.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the device row vanished
    /// between authentication and the update.
    pub async fn heartbeat(
        &self,
        device: &Device,
        battery_pct: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        if !devices::heartbeat(&self.pool, device.id, battery_pct, now).await? {
            return Err(ApiError::NotFound("device"));
        }
        Ok(())
    }
}
