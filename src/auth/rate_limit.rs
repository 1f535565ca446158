//! Fixed-window attempt limiting for PIN verification.
//!
//! The counter store is a trait so single-instance deployments use the
//! in-process map while multi-instance ones can plug in a shared
//! backend. The limiter runs before any PIN comparison and leaks
//! nothing beyond allowed/limited.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Counts verification attempts per client-identifying key.
pub trait AttemptStore: Send + Sync + std::fmt::Debug {
    /// Records one attempt for `key` and returns true when the key has
    /// exceeded `limit` attempts within `window`.
    fn record_and_check(&self, key: &str, limit: u32, window: Duration) -> bool;
}

/// In-process fixed-window counter, suitable for a single instance.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    hits: Mutex<HashMap<String, (u32, Instant)>>,
}

impl InMemoryAttemptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked. Expired entries are swept on
    /// each recorded attempt, so this stays bounded by the set of keys
    /// active within one window.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().map(|hits| hits.len()).unwrap_or(0)
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn record_and_check(&self, key: &str, limit: u32, window: Duration) -> bool {
        let now = Instant::now();
        let Ok(mut hits) = self.hits.lock() else {
            // A poisoned lock means another thread panicked mid-update;
            // failing open here would disable the limiter entirely.
            return true;
        };
        // Keys whose window has lapsed are dead weight; sweep them here
        // so the map never grows past the keys seen in one window.
        hits.retain(|_, (_, window_start)| now.duration_since(*window_start) <= window);
        match hits.get_mut(key) {
            Some((count, window_start)) if now.duration_since(*window_start) <= window => {
                *count += 1;
                *count > limit
            }
            _ => {
                hits.insert(key.to_string(), (1, now));
                false
            }
        }
    }
}

/// Rate limiter bound to a configured window and cap.
#[derive(Debug)]
pub struct RateLimiter<S: AttemptStore> {
    store: S,
    limit: u32,
    window: Duration,
}

impl<S: AttemptStore> RateLimiter<S> {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(store: S, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    /// Records an attempt; true means the caller must be rejected with
    /// a rate-limit error before any credential check.
    #[must_use]
    pub fn is_limited(&self, key: &str) -> bool {
        self.store.record_and_check(key, self.limit, self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32) -> RateLimiter<InMemoryAttemptStore> {
        RateLimiter::new(InMemoryAttemptStore::new(), limit, Duration::from_secs(60))
    }

    #[test]
    fn attempts_under_the_cap_pass() {
        let rl = limiter(8);
        for _ in 0..8 {
            assert!(!rl.is_limited("pin:10.0.0.1"));
        }
    }

    #[test]
    fn ninth_attempt_within_window_is_limited() {
        let rl = limiter(8);
        for _ in 0..8 {
            let _ = rl.is_limited("pin:10.0.0.1");
        }
        assert!(rl.is_limited("pin:10.0.0.1"));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let rl = limiter(2);
        let _ = rl.is_limited("pin:a");
        let _ = rl.is_limited("pin:a");
        assert!(rl.is_limited("pin:a"));
        assert!(!rl.is_limited("pin:b"));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let rl = RateLimiter::new(InMemoryAttemptStore::new(), 2, Duration::ZERO);
        let _ = rl.is_limited("pin:a");
        std::thread::sleep(Duration::from_millis(5));
        // The zero-length window has lapsed, so the counter restarts.
        assert!(!rl.is_limited("pin:a"));
    }

    #[test]
    fn expired_keys_are_swept_on_the_next_attempt() {
        let store = InMemoryAttemptStore::new();
        let _ = store.record_and_check("pin:a", 2, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        let _ = store.record_and_check("pin:b", 2, Duration::ZERO);
        // "pin:a" lapsed before the second attempt, so only "pin:b"
        // remains tracked.
        assert_eq!(store.tracked_keys(), 1);
    }
}
