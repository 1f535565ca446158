//! Authorization gate: PIN verification and attempt limiting.

pub mod pin;
pub mod rate_limit;

pub use pin::{is_valid_pin_shape, verify_pin, verify_pin_any};
pub use rate_limit::{AttemptStore, InMemoryAttemptStore, RateLimiter};
