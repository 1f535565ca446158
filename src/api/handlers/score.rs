//! Score handlers: submission and leaderboards.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LeaderboardQuery, ScoreDto, SubmitScoreRequest};
use super::device_key;
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /scores` — Submit a score from a device.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a bad device key and
/// [`ApiError::InvalidInput`] for empty fields or negative points.
#[utoipa::path(
    post,
    path = "/api/v1/scores",
    tag = "Scores",
    summary = "Submit a score",
    description = "Records a game score under the device's venue and table. Authenticated by the x-device-key header.",
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score recorded", body = ScoreDto),
        (status = 400, description = "Empty fields or negative points", body = ErrorResponse),
        (status = 401, description = "Missing or invalid device key", body = ErrorResponse),
    )
)]
pub async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let device = state.devices.authenticate(device_key(&headers)).await?;
    let score = state
        .scores
        .submit(&device, &req.player_name, &req.game, req.points)
        .await?;
    Ok((StatusCode::CREATED, Json(ScoreDto::from(score))))
}

/// `GET /leaderboard` — Top scores for a venue.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown venue.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Scores",
    summary = "Get a leaderboard",
    description = "Returns the venue's top scores, highest points first with earlier submissions winning ties, optionally restricted to one table.",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Top scores", body = Vec<ScoreDto>),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let scores = state
        .scores
        .leaderboard(&query.slug, query.table_id, query.limit)
        .await?;
    Ok(Json(
        scores.into_iter().map(ScoreDto::from).collect::<Vec<_>>(),
    ))
}

/// Score routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scores", post(submit_score))
        .route("/leaderboard", get(leaderboard))
}
