//! Service layer: business logic orchestration.
//!
//! Each service owns one resource's workflows and delegates interval
//! and transition decisions to the domain layer. Placement mutations
//! share a single shape: serializable transaction, sibling-window
//! fetch, domain conflict scan, write, commit.

pub mod auth_service;
pub mod booking_service;
pub mod device_service;
pub mod schedule_service;
pub mod score_service;
pub mod session_service;

pub use auth_service::AuthService;
pub use booking_service::{BookingService, CreateBooking, MoveBooking};
pub use device_service::DeviceService;
pub use schedule_service::{DaySchedule, ScheduleService};
pub use score_service::ScoreService;
pub use session_service::{SessionService, StartSession};
