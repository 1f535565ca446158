//! Read-side handlers: day schedule, availability, table listing.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    AvailabilityQuery, ScheduleQuery, ScheduleResponse, ScheduleStats, TableDto,
};
use crate::app_state::AppState;
use crate::domain::{Availability, ItemKind, TableId, classify_slot, slot_containing};
use crate::error::{ApiError, ErrorResponse};

/// `GET /schedule` — One merged venue-day timeline.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] for a malformed table filter and
/// [`ApiError::NotFound`] for an unknown venue.
#[utoipa::path(
    get,
    path = "/api/v1/schedule",
    tag = "Schedule",
    summary = "Get the day schedule",
    description = "Returns bookings and sessions overlapping one UTC day, normalized into a single time-ascending timeline. A missing or malformed date falls back to today. The tables parameter restricts the fetch to a comma-separated set of table ids.",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Merged day timeline", body = ScheduleResponse),
        (status = 400, description = "Malformed table filter", body = ErrorResponse),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let table_filter = parse_table_filter(query.tables.as_deref())?;
    let now = Utc::now();
    let schedule = state
        .schedule
        .day_schedule(
            &query.slug,
            query.date.as_deref(),
            table_filter.as_deref(),
            now,
        )
        .await?;

    let stats = ScheduleStats {
        tables: schedule.tables.len(),
        bookings: schedule
            .items
            .iter()
            .filter(|i| i.kind == ItemKind::Booking)
            .count(),
        sessions: schedule
            .items
            .iter()
            .filter(|i| i.kind == ItemKind::Session)
            .count(),
    };

    // Each table carries the state of the slot the request landed in,
    // so the dashboard can paint the grid row without re-deriving it.
    let slot = slot_containing(now);
    let tables = schedule
        .tables
        .into_iter()
        .map(|t| {
            let state = classify_slot(t.id, slot, &schedule.items);
            let mut dto = TableDto::from(t);
            dto.state = Some(state);
            dto
        })
        .collect();

    Ok(Json(ScheduleResponse {
        day_start: schedule.window.start,
        day_end: schedule.window.end,
        tables,
        items: schedule.items,
        stats,
    }))
}

/// Parses the comma-separated `tables` query value into table ids.
fn parse_table_filter(raw: Option<&str>) -> Result<Option<Vec<TableId>>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let uuid = part
            .parse::<uuid::Uuid>()
            .map_err(|_| ApiError::InvalidInput(format!("invalid table id: {part}")))?;
        ids.push(TableId::from_uuid(uuid));
    }
    Ok(if ids.is_empty() { None } else { Some(ids) })
}

/// `GET /availability` — Open minutes for a table from an instant.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown venue or table.
#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Schedule",
    summary = "Get table availability",
    description = "Reports how many whole minutes the table is open before its next non-cancelled booking, capped when no booking is upcoming. Measures from the start parameter when given, otherwise from now.",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Open minutes and next booking", body = Availability),
        (status = 404, description = "Venue or table not found", body = ErrorResponse),
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let from = query.start.unwrap_or_else(Utc::now);
    let availability = state
        .schedule
        .table_availability(&query.slug, query.table_id, from)
        .await?;
    Ok(Json(availability))
}

/// `GET /venues/:slug/tables` — The venue's active tables.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown venue.
#[utoipa::path(
    get,
    path = "/api/v1/venues/{slug}/tables",
    tag = "Schedule",
    summary = "List active tables",
    description = "Returns the venue's active tables ordered by label.",
    params(
        ("slug" = String, Path, description = "Venue slug"),
    ),
    responses(
        (status = 200, description = "Active tables", body = Vec<TableDto>),
        (status = 404, description = "Venue not found", body = ErrorResponse),
    )
)]
pub async fn list_tables(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tables = state.schedule.list_tables(&slug).await?;
    Ok(Json(
        tables.into_iter().map(TableDto::from).collect::<Vec<_>>(),
    ))
}

/// Schedule and availability routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(get_schedule))
        .route("/availability", get(get_availability))
        .route("/venues/{slug}/tables", get(list_tables))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn table_filter_splits_and_trims() {
        let a = uuid::Uuid::new_v4();
        let b = uuid::Uuid::new_v4();
        let raw = format!("{a}, {b}");
        let ids = match parse_table_filter(Some(&raw)) {
            Ok(Some(ids)) => ids,
            other => panic!("expected two ids, got {other:?}"),
        };
        assert_eq!(ids, vec![TableId::from_uuid(a), TableId::from_uuid(b)]);
    }

    #[test]
    fn table_filter_empty_values_mean_no_filter() {
        assert!(matches!(parse_table_filter(None), Ok(None)));
        assert!(matches!(parse_table_filter(Some("")), Ok(None)));
        assert!(matches!(parse_table_filter(Some(" , ")), Ok(None)));
    }

    #[test]
    fn table_filter_rejects_garbage() {
        assert!(parse_table_filter(Some("not-a-uuid")).is_err());
    }
}
