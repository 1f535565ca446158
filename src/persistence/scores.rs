//! Score queries: submission and leaderboard reads.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::models::Score;
use crate::domain::{ScoreId, TableId, VenueId};

type ScoreRow = (
    Uuid,
    Uuid,
    Option<Uuid>,
    String,
    String,
    i32,
    DateTime<Utc>,
);

const SCORE_COLUMNS: &str = "id, venue_id, table_id, player_name, game, points, created_at";

fn from_row(row: ScoreRow) -> Score {
    let (id, venue_id, table_id, player_name, game, points, created_at) = row;
    Score {
        id: ScoreId::from_uuid(id),
        venue_id: VenueId::from_uuid(venue_id),
        table_id: table_id.map(TableId::from_uuid),
        player_name,
        game,
        points,
        created_at,
    }
}

/// Inserts a submitted score.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn insert(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: Option<TableId>,
    player_name: &str,
    game: &str,
    points: i32,
) -> Result<Score, sqlx::Error> {
    let row = sqlx::query_as::<_, ScoreRow>(&format!(
        "INSERT INTO scores (venue_id, table_id, player_name, game, points) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {SCORE_COLUMNS}"
    ))
    .bind(venue_id.as_uuid())
    .bind(table_id.map(|t| *t.as_uuid()))
    .bind(player_name)
    .bind(game)
    .bind(points)
    .fetch_one(executor)
    .await?;

    Ok(from_row(row))
}

/// Returns the top scores for a venue, highest points first with
/// earlier submissions winning ties, optionally restricted to one
/// table.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn leaderboard(
    executor: impl PgExecutor<'_>,
    venue_id: VenueId,
    table_id: Option<TableId>,
    limit: i64,
) -> Result<Vec<Score>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ScoreRow>(&format!(
        "SELECT {SCORE_COLUMNS} FROM scores \
         WHERE venue_id = $1 AND ($2::uuid IS NULL OR table_id = $2) \
         ORDER BY points DESC, created_at ASC \
         LIMIT $3"
    ))
    .bind(venue_id.as_uuid())
    .bind(table_id.map(|t| *t.as_uuid()))
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(from_row).collect())
}
