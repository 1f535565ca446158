//! Venue queries.

use sqlx::PgExecutor;
use uuid::Uuid;

use super::models::Venue;
use crate::domain::VenueId;

/// Looks up a venue by its slug.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on database failure.
pub async fn find_by_slug(
    executor: impl PgExecutor<'_>,
    slug: &str,
) -> Result<Option<Venue>, sqlx::Error> {
    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, slug, name, admin_pin_hash FROM venues WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id, slug, name, admin_pin_hash)| Venue {
        id: VenueId::from_uuid(id),
        slug,
        name,
        admin_pin_hash,
    }))
}
