//! Host PIN verification with attempt limiting.
//!
//! The verification order is fixed: rate limit first, then PIN shape,
//! then hash comparison. Every failure path takes the same opaque
//! error and the same artificial delay, so a caller cannot distinguish
//! an unknown venue from a configured-but-wrong PIN by response shape
//! or timing.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::auth::{InMemoryAttemptStore, RateLimiter, verify_pin_any};
use crate::domain::VenueId;
use crate::error::ApiError;
use crate::persistence::models::Venue;
use crate::persistence::{tables, venues};

/// Orchestration layer for PIN verification.
#[derive(Debug, Clone)]
pub struct AuthService {
    pool: PgPool,
    limiter: Arc<RateLimiter<InMemoryAttemptStore>>,
    allow_when_no_secret: bool,
    failure_delay: Duration,
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(
        pool: PgPool,
        limiter: Arc<RateLimiter<InMemoryAttemptStore>>,
        allow_when_no_secret: bool,
        failure_delay: Duration,
    ) -> Self {
        Self {
            pool,
            limiter,
            allow_when_no_secret,
            failure_delay,
        }
    }

    /// Verifies a host PIN against the venue's admin PIN and the PINs
    /// of its active tables.
    ///
    /// `client_key` identifies the caller for rate limiting (typically
    /// the peer address). Attempts are counted per caller across all
    /// venues, so rotating slugs buys no extra budget, and count
    /// whether or not the PIN turns out to be correct.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RateLimited`] once the attempt cap is hit
    /// and [`ApiError::Unauthorized`] on any verification failure.
    pub async fn verify_host_pin(
        &self,
        slug: &str,
        pin: &str,
        client_key: &str,
    ) -> Result<VenueId, ApiError> {
        if self.limiter.is_limited(&format!("pin:{client_key}")) {
            return Err(ApiError::RateLimited);
        }

        let Some(venue) = venues::find_by_slug(&self.pool, slug).await? else {
            return self.fail().await;
        };

        let table_hashes = tables::active_pin_hashes(&self.pool, venue.id).await?;
        let hashes = venue
            .admin_pin_hash
            .iter()
            .chain(table_hashes.iter())
            .map(String::as_str);

        if verify_pin_any(pin, hashes, self.allow_when_no_secret) {
            Ok(venue.id)
        } else {
            self.fail().await
        }
    }

    /// Authorizes a host mutation against an already-resolved venue.
    ///
    /// A missing `x-host-pin` header is treated like a wrong PIN,
    /// except when no secret is configured anywhere for the venue and
    /// the deployment opted into unauthenticated access. Mutations are
    /// not rate limited; the explicit verify endpoint is the
    /// brute-force surface.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the PIN is missing or
    /// does not match.
    pub async fn authorize_host(&self, venue: &Venue, pin: Option<&str>) -> Result<(), ApiError> {
        let table_hashes = tables::active_pin_hashes(&self.pool, venue.id).await?;
        if venue.admin_pin_hash.is_none() && table_hashes.is_empty() {
            return if self.allow_when_no_secret {
                Ok(())
            } else {
                self.fail().await
            };
        }

        let Some(pin) = pin else {
            return self.fail().await;
        };
        let hashes = venue
            .admin_pin_hash
            .iter()
            .chain(table_hashes.iter())
            .map(String::as_str);
        if verify_pin_any(pin, hashes, self.allow_when_no_secret) {
            Ok(())
        } else {
            self.fail().await
        }
    }

    async fn fail<T>(&self) -> Result<T, ApiError> {
        tokio::time::sleep(self.failure_delay).await;
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // Lazy pools defer connecting until a query runs, so paths that
    // reject before touching the database are unit-testable.
    fn service_with(limiter: Arc<RateLimiter<InMemoryAttemptStore>>) -> AuthService {
        let pool = match PgPool::connect_lazy("postgres://localhost/unreachable") {
            Ok(pool) => pool,
            Err(err) => panic!("lazy pool construction failed: {err}"),
        };
        AuthService::new(pool, limiter, false, Duration::ZERO)
    }

    #[tokio::test]
    async fn attempt_budget_is_shared_across_venue_slugs() {
        let limiter = Arc::new(RateLimiter::new(
            InMemoryAttemptStore::new(),
            2,
            Duration::from_secs(60),
        ));
        // Exhaust the caller's budget against one venue.
        for _ in 0..3 {
            let _ = limiter.is_limited("pin:10.0.0.9");
        }

        // The same caller gets no fresh budget by switching slugs; the
        // limiter rejects before any venue lookup.
        let service = service_with(limiter);
        let outcome = service
            .verify_host_pin("another-venue", "123456", "10.0.0.9")
            .await;
        assert!(matches!(outcome, Err(ApiError::RateLimited)));
    }
}
