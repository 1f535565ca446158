//! Persistence layer: PostgreSQL queries via `sqlx`.
//!
//! Query functions take `impl PgExecutor` so the same function runs
//! against the pool for plain reads and against an open transaction
//! for check-then-write sequences. Every mutating sequence in the
//! services goes through [`begin_serializable`]; the schema's
//! exclusion/unique constraints back the application-level scans.

pub mod bookings;
pub mod devices;
pub mod models;
pub mod scores;
pub mod sessions;
pub mod tables;
pub mod venues;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use crate::config::AppConfig;

/// Builds the connection pool from configuration.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] when the database is unreachable.
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// Opens a serializable transaction.
///
/// All check-then-write sequences (overlap scan followed by insert or
/// update) run under serializable isolation so two concurrent writers
/// cannot both pass the scan and both commit.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] when the transaction cannot be opened.
pub async fn begin_serializable(pool: &PgPool) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// True when a database error is a unique or exclusion constraint
/// violation — a concurrent writer won the race our scan missed.
#[must_use]
pub fn is_constraint_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505" || code == "23P01")
}
