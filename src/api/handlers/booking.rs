//! Booking handlers: create, move, status transitions, delete.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::Utc;

use super::host_pin;
use crate::api::dto::{
    BookingDto, BookingStatusRequest, CreateBookingRequest, MoveBookingRequest, VenueScope,
};
use crate::app_state::AppState;
use crate::domain::{BookingId, BookingStatus, Interval};
use crate::error::{ApiError, ErrorResponse};
use crate::service::{CreateBooking, MoveBooking};

/// `POST /bookings` — Create a booking.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input, unknown venue/table, or an
/// interval conflict.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Create a booking",
    description = "Reserves a half-open interval on a table, starting in the future. Intervals may touch end-to-start without conflicting. An idempotency key makes retries safe. Authorized by the x-host-pin header.",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingDto),
        (status = 400, description = "Invalid or past interval", body = ErrorResponse),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue or table not found", body = ErrorResponse),
        (status = 409, description = "Interval conflicts with a sibling", body = ErrorResponse),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let booking = state
        .bookings
        .create(
            &req.slug,
            host_pin(&headers),
            CreateBooking {
                table_id: req.table_id,
                interval: Interval::new(req.start_at, req.end_at),
                party_name: req.party_name,
                notes: req.notes,
                idempotency_key: req.idempotency_key,
            },
            now,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingDto::from_booking(booking, now)),
    ))
}

/// `POST /bookings/move` — Move a booking to a new table/interval.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input, unknown records, or an
/// interval conflict.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/move",
    tag = "Bookings",
    summary = "Move a booking",
    description = "Re-places a booking onto a new table and/or future interval; omitted placement fields keep their current values. The booking's own old window is excluded from the conflict scan. Authorized by the x-host-pin header.",
    request_body = MoveBookingRequest,
    responses(
        (status = 200, description = "Booking moved", body = BookingDto),
        (status = 400, description = "Invalid or past interval", body = ErrorResponse),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue, table, or booking not found", body = ErrorResponse),
        (status = 409, description = "Interval conflicts with a sibling", body = ErrorResponse),
    )
)]
pub async fn move_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MoveBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let booking = state
        .bookings
        .move_booking(
            &req.slug,
            host_pin(&headers),
            MoveBooking {
                booking_id: req.booking_id,
                table_id: req.table_id,
                start_at: req.start_at,
                end_at: req.end_at,
                party_name: req.party_name,
                notes: req.notes,
            },
            now,
        )
        .await?;

    Ok(Json(BookingDto::from_booking(booking, now)))
}

/// `POST /bookings/status` — Apply a status transition.
///
/// # Errors
///
/// Returns [`ApiError`] on an unknown status, unknown records, or a
/// transition rejected by strict mode.
#[utoipa::path(
    post,
    path = "/api/v1/bookings/status",
    tag = "Bookings",
    summary = "Change booking status",
    description = "Sets a booking to ARRIVED, NO_SHOW, CANCELLED, or COMPLETED. The matching timestamp is stamped on first entry only. Authorized by the x-host-pin header.",
    request_body = BookingStatusRequest,
    responses(
        (status = 200, description = "Status applied", body = BookingDto),
        (status = 400, description = "Unknown status or rejected transition", body = ErrorResponse),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue or booking not found", body = ErrorResponse),
    )
)]
pub async fn booking_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BookingStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let requested = BookingStatus::parse(&req.status)
        .ok_or_else(|| ApiError::InvalidInput(format!("unknown status: {}", req.status)))?;

    let now = Utc::now();
    let booking = state
        .bookings
        .set_status(&req.slug, host_pin(&headers), req.booking_id, requested, now)
        .await?;

    Ok(Json(BookingDto::from_booking(booking, now)))
}

/// `DELETE /bookings/:id` — Delete a booking outright.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the venue or booking does not
/// exist.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Delete a booking",
    description = "Removes a booking entirely, freeing its interval for new reservations. Authorized by the x-host-pin header.",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
        VenueScope,
    ),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 401, description = "Missing or invalid host PIN", body = ErrorResponse),
        (status = 404, description = "Venue or booking not found", body = ErrorResponse),
    )
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
    Query(scope): Query<VenueScope>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .bookings
        .delete(&scope.slug, host_pin(&headers), BookingId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/move", post(move_booking))
        .route("/bookings/status", post(booking_status))
        .route("/bookings/{id}", delete(delete_booking))
}
