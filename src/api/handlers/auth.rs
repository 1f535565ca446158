//! PIN verification handler.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{VerifyPinRequest, VerifyPinResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /pin/verify` — Verify a host PIN for a venue.
///
/// # Errors
///
/// Returns [`ApiError::RateLimited`] past the attempt cap and
/// [`ApiError::Unauthorized`] on any verification failure.
#[utoipa::path(
    post,
    path = "/api/v1/pin/verify",
    tag = "Auth",
    summary = "Verify a host PIN",
    description = "Checks a six-digit PIN against the venue's admin PIN and its active tables' PINs. Attempts are rate limited per venue per caller, and every failure mode returns the same opaque 401.",
    request_body = VerifyPinRequest,
    responses(
        (status = 200, description = "PIN accepted", body = VerifyPinResponse),
        (status = 401, description = "PIN rejected", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse),
    )
)]
pub async fn verify_pin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VerifyPinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client = client_key(&headers);
    let venue_id = state.auth.verify_host_pin(&req.slug, &req.pin, client).await?;
    Ok(Json(VerifyPinResponse { ok: true, venue_id }))
}

/// Identifies the caller for rate limiting: the first `x-forwarded-for`
/// hop when present, otherwise a shared bucket.
fn client_key(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("direct")
}

/// PIN verification routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pin/verify", post(verify_pin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_header_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.1, 172.16.0.9"),
        );
        assert_eq!(client_key(&headers), "10.0.0.1");
    }

    #[test]
    fn missing_header_falls_back_to_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "direct");
    }
}
