//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{InMemoryAttemptStore, RateLimiter};
use crate::config::AppConfig;
use crate::service::{
    AuthService, BookingService, DeviceService, ScheduleService, ScoreService, SessionService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking workflows.
    pub bookings: BookingService,
    /// Session workflows.
    pub sessions: SessionService,
    /// Schedule and availability reads.
    pub schedule: ScheduleService,
    /// Host PIN verification.
    pub auth: AuthService,
    /// Device lifecycle.
    pub devices: DeviceService,
    /// Score submission and leaderboards.
    pub scores: ScoreService,
}

impl AppState {
    /// Wires the services over one connection pool.
    #[must_use]
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(
            InMemoryAttemptStore::new(),
            config.pin_attempt_limit,
            Duration::from_secs(config.pin_attempt_window_secs),
        ));

        let auth = AuthService::new(
            pool.clone(),
            limiter,
            config.allow_unauthenticated_when_no_secret,
            Duration::from_millis(config.pin_failure_delay_ms),
        );

        Self {
            bookings: BookingService::new(
                pool.clone(),
                auth.clone(),
                config.strict_booking_transitions,
            ),
            sessions: SessionService::new(pool.clone(), auth.clone()),
            schedule: ScheduleService::new(pool.clone(), config.max_unbooked_minutes),
            auth,
            devices: DeviceService::new(pool.clone()),
            scores: ScoreService::new(pool),
        }
    }
}
