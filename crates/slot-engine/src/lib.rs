//! # slot-engine
//!
//! Bookable appointment slots for a doctor's recurring weekly schedule.
//!
//! Working hours are kept in the doctor's local wall-clock time; time off and
//! bookings are absolute UTC instants. The engine resolves each local shift to
//! real instants with `chrono-tz`, so the same "09:00" lands on a different UTC
//! hour either side of a DST change, then drops the slots that cannot be
//! booked.
//!
//! ## Modules
//!
//! - [`civil`] — `CivilTime` and the local → UTC conversion
//! - [`dst`] — policies for wall-clock times inside a DST gap
//! - [`schedule`] — `WeeklySchedule`, `Shift`, save-time validation
//! - [`blocks`] — overrides (time off) and bookings
//! - [`conflict`] — half-open interval overlap
//! - [`config`] — engine parameters
//! - [`engine`] — the pure slot computation
//! - [`directory`] — fetch-then-compute wrapper over a data source
//! - [`view`] — the doctor's merged schedule view
//! - [`error`] — Error types

pub mod blocks;
pub mod civil;
pub mod config;
pub mod conflict;
pub mod directory;
pub mod dst;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod view;

pub use blocks::{Booking, BookingStatus, Override, OverrideType, TimeOffRequest};
pub use civil::{format_instant, parse_instant, resolve_timezone, CivilTime};
pub use config::{FetchFailurePolicy, SlotEngineConfig};
pub use directory::{get_doctor_slots, get_schedule_view, DoctorDirectory, DoctorRecord, InMemoryDirectory, SlotsResponse};
pub use dst::DstPolicy;
pub use engine::{compute_available_slots, SlotQuery};
pub use error::SlotError;
pub use schedule::{Shift, WeeklySchedule};
pub use view::{EntryKind, ScheduleEntry, ScheduleView};
