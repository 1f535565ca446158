//! Session handlers: host start, update, end, extend, plus the
//! device-key-authenticated start/stop/current endpoints.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    DeviceStartSessionRequest, EndSessionRequest, ExtendSessionRequest, SessionDto,
    StartSessionRequest, UpdateSessionRequest,
};
use super::{device_key, host_pin};
use crate::app_state::AppState;
use crate::domain::Interval;
use crate::error::{ApiError, ErrorResponse};
use crate::service::StartSession;

/// `POST /sessions` — Start a session from the host view.
///
/// # Errors
///
/// Returns [`ApiError`] when the table is occupied or a booking blocks
/// the window.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Start a session",
    description = "Starts a session over an explicit window chosen by the host. Passing the booking being seated excludes it from the conflict scan. Authorized by the x-host-pin header.",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionDto),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue or table not found", body = ErrorResponse),
        (status = 409, description = "Table occupied or booking in the way", body = ErrorResponse),
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .start_for_host(
            &req.slug,
            host_pin(&headers),
            StartSession {
                table_id: req.table_id,
                interval: Interval::new(req.starts_at, req.ends_at),
                booking_id: req.booking_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SessionDto::from(session))))
}

/// `POST /sessions/update` — Move a running session.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input, unknown records, or an
/// interval conflict.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/update",
    tag = "Sessions",
    summary = "Update a running session",
    description = "Re-places a running session onto a new table and/or future window, excluding the session itself from the conflict scan. Authorized by the x-host-pin header.",
    request_body = UpdateSessionRequest,
    responses(
        (status = 200, description = "Session updated", body = SessionDto),
        (status = 400, description = "Invalid or past interval", body = ErrorResponse),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue, table, or session not found", body = ErrorResponse),
        (status = 409, description = "Interval conflicts with a sibling", body = ErrorResponse),
    )
)]
pub async fn update_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .update(
            &req.slug,
            host_pin(&headers),
            req.session_id,
            req.table_id,
            Interval::new(req.starts_at, req.ends_at),
            Utc::now(),
        )
        .await?;

    Ok(Json(SessionDto::from(session)))
}

/// `POST /sessions/end` — End a running session.
///
/// # Errors
///
/// Returns [`ApiError`] for unknown records or an already-stopped
/// session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/end",
    tag = "Sessions",
    summary = "End a session",
    description = "Stops a running session, truncating its window at the supplied close instant or at the current time. Authorized by the x-host-pin header.",
    request_body = EndSessionRequest,
    responses(
        (status = 200, description = "Session ended", body = SessionDto),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue or session not found, or not running", body = ErrorResponse),
    )
)]
pub async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<EndSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ends_at = req.ends_at.unwrap_or_else(Utc::now);
    let session = state
        .sessions
        .end(&req.slug, host_pin(&headers), req.session_id, ends_at)
        .await?;
    Ok(Json(SessionDto::from(session)))
}

/// `POST /sessions/extend` — Extend a running session.
///
/// # Errors
///
/// Returns [`ApiError`] when the added tail collides with a booking or
/// session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/extend",
    tag = "Sessions",
    summary = "Extend a session",
    description = "Adds minutes to a running session's scheduled end. Only the newly claimed tail is checked for conflicts.",
    request_body = ExtendSessionRequest,
    responses(
        (status = 200, description = "Session extended", body = SessionDto),
        (status = 400, description = "Non-positive minutes", body = ErrorResponse),
        (status = 404, description = "Venue or session not found, or not running", body = ErrorResponse),
        (status = 409, description = "Tail conflicts with a sibling", body = ErrorResponse),
    )
)]
pub async fn extend_session(
    State(state): State<AppState>,
    Json(req): Json<ExtendSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .extend(&req.slug, req.session_id, req.minutes)
        .await?;
    Ok(Json(SessionDto::from(session)))
}

/// `POST /device/sessions/start` — Start a session as a device.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a bad device key, plus the
/// host-start errors.
#[utoipa::path(
    post,
    path = "/api/v1/device/sessions/start",
    tag = "Device Sessions",
    summary = "Start a session from a device",
    description = "Starts a session on the device's bound table, first stopping any session the device was already running. Authenticated by the x-device-key header.",
    request_body = DeviceStartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = SessionDto),
        (status = 401, description = "Missing or invalid device key", body = ErrorResponse),
        (status = 409, description = "Table occupied or booking in the way", body = ErrorResponse),
    )
)]
pub async fn device_start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DeviceStartSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state.devices.authenticate(device_key(&headers)).await?;
    let session = state
        .sessions
        .start_for_device(&device, req.minutes, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(SessionDto::from(session))))
}

/// `POST /device/sessions/stop` — Stop the device's running session.
///
/// # Errors
///
/// Returns [`ApiError::NoRunningSession`] when the device has none.
#[utoipa::path(
    post,
    path = "/api/v1/device/sessions/stop",
    tag = "Device Sessions",
    summary = "Stop the device's session",
    description = "Stops whatever session the device is currently running. Authenticated by the x-device-key header.",
    responses(
        (status = 200, description = "Session stopped", body = SessionDto),
        (status = 401, description = "Missing or invalid device key", body = ErrorResponse),
        (status = 404, description = "No running session", body = ErrorResponse),
    )
)]
pub async fn device_stop_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let device = state.devices.authenticate(device_key(&headers)).await?;
    let session = state.sessions.end_for_device(&device, Utc::now()).await?;
    Ok(Json(SessionDto::from(session)))
}

/// `GET /device/sessions/current` — The device's running session.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a bad device key.
#[utoipa::path(
    get,
    path = "/api/v1/device/sessions/current",
    tag = "Device Sessions",
    summary = "Get the device's current session",
    description = "Returns the device's running session, or null when it has none. Authenticated by the x-device-key header.",
    responses(
        (status = 200, description = "Current session or null", body = Option<SessionDto>),
        (status = 401, description = "Missing or invalid device key", body = ErrorResponse),
    )
)]
pub async fn device_current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let device = state.devices.authenticate(device_key(&headers)).await?;
    let session = state.sessions.current_for_device(&device).await?;
    Ok(Json(session.map(SessionDto::from)))
}

/// Session routes (host and device).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/update", post(update_session))
        .route("/sessions/end", post(end_session))
        .route("/sessions/extend", post(extend_session))
        .route("/device/sessions/start", post(device_start_session))
        .route("/device/sessions/stop", post(device_stop_session))
        .route("/device/sessions/current", get(device_current_session))
}
