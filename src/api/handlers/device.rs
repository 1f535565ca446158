//! Device handlers: claiming and heartbeats.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{ClaimDeviceRequest, ClaimDeviceResponse, HeartbeatRequest};
use super::device_key;
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /devices/claim` — Claim a device into a venue.
///
/// # Errors
///
/// Returns [`ApiError`] for an empty external id or an unknown
/// venue/table.
#[utoipa::path(
    post,
    path = "/api/v1/devices/claim",
    tag = "Devices",
    summary = "Claim a device",
    description = "Binds a device (by its stable external id) to a venue and optionally a table, issuing a fresh device key. Re-claiming rotates the key.",
    request_body = ClaimDeviceRequest,
    responses(
        (status = 201, description = "Device claimed", body = ClaimDeviceResponse),
        (status = 400, description = "Empty external id", body = ErrorResponse),
        (status = 404, description = "Venue or table not found", body = ErrorResponse),
    )
)]
pub async fn claim_device(
    State(state): State<AppState>,
    Json(req): Json<ClaimDeviceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state
        .devices
        .claim(&req.slug, &req.external_id, req.table_id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(ClaimDeviceResponse::from(device))))
}

/// `POST /devices/heartbeat` — Record a device heartbeat.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a bad device key.
#[utoipa::path(
    post,
    path = "/api/v1/devices/heartbeat",
    tag = "Devices",
    summary = "Record a heartbeat",
    description = "Marks the device as seen and stores its battery level when reported. Authenticated by the x-device-key header.",
    request_body = HeartbeatRequest,
    responses(
        (status = 204, description = "Heartbeat recorded"),
        (status = 401, description = "Missing or invalid device key", body = ErrorResponse),
    )
)]
pub async fn device_heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<HeartbeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state.devices.authenticate(device_key(&headers)).await?;
    state
        .devices
        .heartbeat(&device, req.battery_pct, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Device lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices/claim", post(claim_device))
        .route("/devices/heartbeat", post(device_heartbeat))
}
