//! Data Transfer Objects for REST request/response serialization.
//!
//! Instants are RFC 3339 timestamps; entity ids are UUID strings.
//! Requests carry the venue slug explicitly so every operation is
//! scoped server-side.

pub mod auth_dto;
pub mod booking_dto;
pub mod device_dto;
pub mod schedule_dto;
pub mod score_dto;
pub mod session_dto;

pub use auth_dto::*;
pub use booking_dto::*;
pub use device_dto::*;
pub use schedule_dto::*;
pub use score_dto::*;
pub use session_dto::*;
