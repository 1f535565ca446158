//! PIN verification DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::VenueId;

/// Request body for `POST /pin/verify`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPinRequest {
    /// Venue slug.
    pub slug: String,
    /// Six-digit PIN to verify.
    pub pin: String,
}

/// Response body for a successful `POST /pin/verify`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPinResponse {
    /// Always true; failures are reported as errors.
    pub ok: bool,
    /// The venue the PIN unlocked.
    pub venue_id: VenueId,
}
