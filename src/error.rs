//! Service error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type. Each variant maps to a
//! specific HTTP status code and structured JSON error response.
//! Unauthorized responses carry one fixed message so callers cannot
//! tell a missing venue secret from a PIN mismatch.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::Conflict;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid interval: end must be after start",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2999 | Not Found         | 404 Not Found              |
/// | 2100–2199 | Conflict          | 409 Conflict               |
/// | 2401/2429 | Auth / Rate limit | 401 / 429                  |
/// | 3000–3999 | Server            | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed before any write was attempted.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// Venue/table/booking/session/device absent or not owned by the
    /// given scope.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// PIN or device key mismatch. Message is deliberately opaque.
    #[error("unauthorized")]
    Unauthorized,

    /// The proposed interval overlaps a sibling on the same table.
    #[error("interval overlaps an existing {}", conflict_noun(.0))]
    Overlap(Conflict),

    /// A running session already exists where none may.
    #[error("a session is already running for this table")]
    SessionAlreadyRunning,

    /// No running session to act on.
    #[error("no running session found")]
    NoRunningSession,

    /// Client exceeded the PIN verification attempt cap.
    #[error("too many attempts; try again shortly")]
    RateLimited,

    /// Database failure. Detail is logged server-side, never exposed.
    #[error("storage error")]
    Database(#[from] sqlx::Error),

    /// Internal server error.
    #[error("internal error")]
    Internal(String),
}

const fn conflict_noun(conflict: &Conflict) -> &'static str {
    match conflict {
        Conflict::Booking(_) => "booking",
        Conflict::Session(_) => "session",
    }
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidInput(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Overlap(_) => 2101,
            Self::SessionAlreadyRunning => 2102,
            Self::NoRunningSession => 2002,
            Self::Unauthorized => 2401,
            Self::RateLimited => 2429,
            Self::Database(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::NoRunningSession => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Overlap(_) | Self::SessionAlreadyRunning => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage/internal detail stays in the server log.
        match &self {
            Self::Database(e) => tracing::error!(error = %e, "storage failure"),
            Self::Internal(detail) => tracing::error!(detail, "internal failure"),
            _ => {}
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ids::{BookingId, SessionId};

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::InvalidInput(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("venue").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Overlap(Conflict::Booking(BookingId::new())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn overlap_message_names_the_sibling_kind() {
        let booking = ApiError::Overlap(Conflict::Booking(BookingId::new()));
        assert!(booking.to_string().contains("booking"));
        let session = ApiError::Overlap(Conflict::Session(SessionId::new()));
        assert!(session.to_string().contains("session"));
    }

    #[test]
    fn unauthorized_message_is_opaque() {
        assert_eq!(ApiError::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn error_body_exposes_an_openapi_schema() {
        // Handlers reference `body = ErrorResponse` in their OpenAPI
        // annotations, which requires a schema for both structs.
        let _ = <ErrorResponse as utoipa::PartialSchema>::schema();
        let _ = <ErrorBody as utoipa::PartialSchema>::schema();
    }
}
