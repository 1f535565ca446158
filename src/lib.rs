//! # tablekeep
//!
//! Table booking and session management service for entertainment
//! venues (dart halls, pool clubs, game bars).
//!
//! One table carries two kinds of time claims: bookings (planned
//! reservations over a half-open interval) and sessions (live
//! occupancy, started by staff or by an at-table device). The system's
//! core invariant is overlap freedom on each table's timeline; the two
//! kinds are checked against each other everywhere a claim is created
//! or re-placed.
//!
//! ## Architecture
//!
//! ```text
//! Clients (host dashboard, at-table devices)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── Services (service/): orchestration per resource
//!     ├── Domain (domain/): pure interval/transition/merge logic
//!     ├── Auth (auth/): PIN verification + attempt limiting
//!     │
//!     └── PostgreSQL Persistence (persistence/, migrations/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
