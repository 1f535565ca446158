//! Game score submission and leaderboard reads.

use sqlx::PgPool;

use crate::domain::TableId;
use crate::error::ApiError;
use crate::persistence::models::{Device, Score};
use crate::persistence::{scores, venues};

/// Largest leaderboard page a caller may request.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Leaderboard page size when the caller does not specify one.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Orchestration layer for score operations.
#[derive(Debug, Clone)]
pub struct ScoreService {
    pool: PgPool,
}

impl ScoreService {
    /// Creates a new `ScoreService`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a score submitted by a claimed device.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an empty player name or
    /// game, or a negative point count.
    pub async fn submit(
        &self,
        device: &Device,
        player_name: &str,
        game: &str,
        points: i32,
    ) -> Result<Score, ApiError> {
        let player_name = player_name.trim();
        let game = game.trim();
        if player_name.is_empty() {
            return Err(ApiError::InvalidInput(
                "player name must not be empty".to_string(),
            ));
        }
        if game.is_empty() {
            return Err(ApiError::InvalidInput("game must not be empty".to_string()));
        }
        if points < 0 {
            return Err(ApiError::InvalidInput(
                "points must not be negative".to_string(),
            ));
        }

        let score = scores::insert(
            &self.pool,
            device.venue_id,
            device.table_id,
            player_name,
            game,
            points,
        )
        .await?;
        tracing::info!(score_id = %score.id, game, points, "score recorded");
        Ok(score)
    }

    /// Returns the venue's top scores, optionally restricted to one
    /// table.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown venue.
    pub async fn leaderboard(
        &self,
        slug: &str,
        table_id: Option<TableId>,
        limit: Option<i64>,
    ) -> Result<Vec<Score>, ApiError> {
        let venue = venues::find_by_slug(&self.pool, slug)
            .await?
            .ok_or(ApiError::NotFound("venue"))?;
        let limit = clamp_limit(limit);
        Ok(scores::leaderboard(&self.pool, venue.id, table_id, limit).await?)
    }
}

/// Clamps a requested page size into `1..=100`, defaulting to 10.
fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(5)), 5);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-3)), 1);
        assert_eq!(clamp_limit(Some(1000)), 100);
    }
}
