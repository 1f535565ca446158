//! tablekeep server entry point.
//!
//! Starts the Axum HTTP server over a migrated PostgreSQL database.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tablekeep::api;
use tablekeep::app_state::AppState;
use tablekeep::config::AppConfig;
use tablekeep::persistence;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting tablekeep");

    // Connect and migrate
    let pool = persistence::connect(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build application state
    let app_state = AppState::new(pool, &config);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
