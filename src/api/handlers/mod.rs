//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod booking;
pub mod device;
pub mod schedule;
pub mod score;
pub mod session;
pub mod system;

use axum::Router;
use axum::http::HeaderMap;

use crate::app_state::AppState;

/// Extracts the device key presented in the `x-device-key` header.
#[must_use]
pub fn device_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-device-key").and_then(|v| v.to_str().ok())
}

/// Extracts the host PIN presented in the `x-host-pin` header.
#[must_use]
pub fn host_pin(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-host-pin").and_then(|v| v.to_str().ok())
}

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(booking::routes())
        .merge(session::routes())
        .merge(schedule::routes())
        .merge(auth::routes())
        .merge(device::routes())
        .merge(score::routes())
}
