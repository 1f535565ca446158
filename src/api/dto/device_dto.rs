//! Device DTOs for claiming and heartbeats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DeviceId, TableId};
use crate::persistence::models::Device;

/// Request body for `POST /devices/claim`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimDeviceRequest {
    /// Venue slug.
    pub slug: String,
    /// Stable hardware identifier reported by the device.
    pub external_id: String,
    /// Table to bind the device to, if known at claim time.
    #[serde(default)]
    pub table_id: Option<TableId>,
}

/// Response body for `POST /devices/claim`.
///
/// The key is returned only here; subsequent device calls present it
/// in the `x-device-key` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimDeviceResponse {
    /// Assigned device id.
    pub device_id: DeviceId,
    /// Opaque per-claim key for device-authenticated endpoints.
    pub device_key: String,
    /// Table the device is bound to, if any.
    pub table_id: Option<TableId>,
    /// Claim instant.
    pub claimed_at: DateTime<Utc>,
}

impl From<Device> for ClaimDeviceResponse {
    fn from(d: Device) -> Self {
        Self {
            device_id: d.id,
            device_key: d.device_key,
            table_id: d.table_id,
            claimed_at: d.claimed_at,
        }
    }
}

/// Request body for `POST /devices/heartbeat`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HeartbeatRequest {
    /// Battery level in percent, when the device reports one.
    #[serde(default)]
    pub battery_pct: Option<i32>,
}
