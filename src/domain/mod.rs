//! Domain layer: the pure scheduling core.
//!
//! Everything in this module is I/O-free and deterministic (clocks are
//! injected). The overlap rule, day-window computation, conflict scan,
//! schedule merge, and availability arithmetic all live here so the
//! services stay thin orchestration over the store.

pub mod availability;
pub mod booking;
pub mod conflict;
pub mod day_window;
pub mod ids;
pub mod interval;
pub mod schedule;
pub mod session;

pub use availability::{Availability, availability};
pub use booking::{Booking, BookingStatus, BookingTag, plan_transition};
pub use conflict::{BookingWindow, Conflict, SessionWindow, find_conflict};
pub use day_window::day_window;
pub use ids::{BookingId, DeviceId, ScoreId, SessionId, TableId, VenueId};
pub use interval::Interval;
pub use schedule::{ItemKind, ScheduleItem, SlotState, classify_slot, merge_items, slot_containing};
pub use session::{
    Session, SessionStatus, clamp_minutes, extended_end, round_up_to_slot,
};
