//! Score DTOs for submission and leaderboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ScoreId, TableId};
use crate::persistence::models::Score;

/// Request body for `POST /scores`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitScoreRequest {
    /// Player display name.
    pub player_name: String,
    /// Game identifier.
    pub game: String,
    /// Points achieved; must not be negative.
    pub points: i32,
}

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Venue slug.
    pub slug: String,
    /// Restrict to scores submitted from one table.
    #[serde(default)]
    pub table_id: Option<TableId>,
    /// Page size, clamped to `1..=100`; defaults to 10.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// A recorded score as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreDto {
    /// Score id.
    pub id: ScoreId,
    /// Table the score was submitted from, if bound.
    pub table_id: Option<TableId>,
    /// Player display name.
    pub player_name: String,
    /// Game identifier.
    pub game: String,
    /// Points achieved.
    pub points: i32,
    /// Submission instant.
    pub created_at: DateTime<Utc>,
}

impl From<Score> for ScoreDto {
    fn from(s: Score) -> Self {
        Self {
            id: s.id,
            table_id: s.table_id,
            player_name: s.player_name,
            game: s.game,
            points: s.points,
            created_at: s.created_at,
        }
    }
}
