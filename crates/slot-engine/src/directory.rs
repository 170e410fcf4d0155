//! Fetch-then-compute wrapper around the engine.
//!
//! [`DoctorDirectory`] is the seam to whatever stores doctors, time off, and
//! appointments. [`get_doctor_slots`] fetches the three inputs for one doctor,
//! runs the engine, and folds every failure into a [`SlotsResponse`] so callers
//! never have to handle an `Err`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blocks::{Booking, Override};
use crate::civil::{format_instant, resolve_timezone};
use crate::config::{FetchFailurePolicy, SlotEngineConfig};
use crate::conflict::Interval;
use crate::engine::{compute_available_slots, query_window};
use crate::error::{Result, SlotError};
use crate::schedule::WeeklySchedule;
use crate::view::{merge_schedule_view, ScheduleView};

/// The doctor columns the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    #[serde(default)]
    pub weekly_schedule: Option<WeeklySchedule>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
}

/// Read access to doctor data.
pub trait DoctorDirectory {
    /// `Ok(None)` when no doctor has this id.
    fn fetch_doctor(&self, doctor_id: &str) -> Result<Option<DoctorRecord>>;

    /// Overrides with `start_time <= window.end && end_time >= window.start`.
    fn fetch_overrides(&self, doctor_id: &str, window: &Interval) -> Result<Vec<Override>>;

    /// Confirmed bookings with `window.start <= scheduled_at <= window.end`.
    fn fetch_confirmed_bookings(&self, doctor_id: &str, window: &Interval) -> Result<Vec<Booking>>;
}

/// Result of [`get_doctor_slots`].
///
/// An empty `slots` with no `error` means fully booked; an empty `slots` with
/// an `error` means the doctor cannot be booked right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub slots: Vec<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl SlotsResponse {
    pub fn failed(error: &SlotError) -> Self {
        Self {
            slots: Vec::new(),
            error: Some(error.to_string()),
            warnings: Vec::new(),
        }
    }
}

/// Everything fetched for one doctor, ready for the engine.
struct Loaded {
    schedule: WeeklySchedule,
    tz: chrono_tz::Tz,
    window: Interval,
    overrides: Vec<Override>,
    bookings: Vec<Booking>,
    warnings: Vec<String>,
}

fn degrade<T>(
    fetched: Result<Vec<T>>,
    what: &str,
    policy: FetchFailurePolicy,
    warnings: &mut Vec<String>,
) -> Result<Vec<T>> {
    match fetched {
        Ok(items) => Ok(items),
        Err(e) => match policy {
            FetchFailurePolicy::FailOpen => {
                warn!(source = what, error = %e, "fetch failed; continuing without it");
                warnings.push(format!("could not check {}: {}", what, e));
                Ok(Vec::new())
            }
            FetchFailurePolicy::FailClosed => {
                warn!(source = what, error = %e, "fetch failed; offering no slots");
                Err(SlotError::Unverified)
            }
        },
    }
}

fn load(
    directory: &impl DoctorDirectory,
    doctor_id: &str,
    now: DateTime<Utc>,
    config: &SlotEngineConfig,
) -> Result<Loaded> {
    config.validate()?;

    let doctor = match directory.fetch_doctor(doctor_id) {
        Ok(Some(doctor)) => doctor,
        Ok(None) => return Err(SlotError::DoctorNotFound),
        Err(e) => {
            warn!(doctor_id, error = %e, "doctor fetch failed");
            return Err(SlotError::DoctorNotFound);
        }
    };

    let tz = resolve_timezone(doctor.time_zone.as_deref())?;
    let window = query_window(now, config);
    let mut warnings = Vec::new();

    let overrides = degrade(
        directory.fetch_overrides(doctor_id, &window),
        "time off",
        config.on_fetch_failure,
        &mut warnings,
    )?;
    // A booking that began shortly before `now` can still overlap the first slot.
    let booking_window = Interval::new(window.start - Duration::minutes(config.booking_minutes), window.end);
    let bookings = degrade(
        directory.fetch_confirmed_bookings(doctor_id, &booking_window),
        "existing bookings",
        config.on_fetch_failure,
        &mut warnings,
    )?;

    debug!(
        doctor_id,
        zone = tz.name(),
        overrides = overrides.len(),
        bookings = bookings.len(),
        "loaded doctor availability inputs"
    );

    Ok(Loaded {
        schedule: doctor.weekly_schedule.unwrap_or_default(),
        tz,
        window,
        overrides,
        bookings,
        warnings,
    })
}

/// Bookable slots for `doctor_id` over the horizon starting at `now`.
///
/// Never fails: a missing doctor (or a failed doctor fetch) yields
/// `error = "Doctor not found"`, an unknown zone yields
/// `error = "Invalid timezone: <name>"`. Override and booking fetch failures
/// follow `config.on_fetch_failure`.
pub fn get_doctor_slots(
    directory: &impl DoctorDirectory,
    doctor_id: &str,
    now: DateTime<Utc>,
    config: &SlotEngineConfig,
) -> SlotsResponse {
    let loaded = match load(directory, doctor_id, now, config) {
        Ok(loaded) => loaded,
        Err(e) => return SlotsResponse::failed(&e),
    };

    let slots = compute_available_slots(
        &loaded.schedule,
        &loaded.tz,
        &loaded.overrides,
        &loaded.bookings,
        now,
        config,
    );

    SlotsResponse {
        slots: slots.iter().map(format_instant).collect(),
        error: None,
        warnings: loaded.warnings,
    }
}

/// The doctor's merged calendar: free slots and confirmed bookings.
///
/// # Errors
/// Same conditions as the `error` field of [`get_doctor_slots`].
pub fn get_schedule_view(
    directory: &impl DoctorDirectory,
    doctor_id: &str,
    now: DateTime<Utc>,
    config: &SlotEngineConfig,
) -> Result<ScheduleView> {
    let loaded = load(directory, doctor_id, now, config)?;

    let slots = compute_available_slots(
        &loaded.schedule,
        &loaded.tz,
        &loaded.overrides,
        &loaded.bookings,
        now,
        config,
    );

    Ok(ScheduleView {
        entries: merge_schedule_view(&slots, &loaded.bookings, &loaded.window, config),
        warnings: loaded.warnings,
    })
}

/// An override row with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorOverride {
    pub doctor_id: String,
    #[serde(flatten)]
    pub entry: Override,
}

/// An appointment row with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub doctor_id: String,
    #[serde(flatten)]
    pub booking: Booking,
}

/// A directory held entirely in memory, loadable from JSON of the shape
/// `{"doctors": {"<id>": {...}}, "overrides": [...], "appointments": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryDirectory {
    #[serde(default)]
    pub doctors: BTreeMap<String, DoctorRecord>,
    #[serde(default)]
    pub overrides: Vec<DoctorOverride>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl InMemoryDirectory {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SlotError::Fetch(format!("invalid directory JSON: {}", e)))
    }

    pub fn with_doctor(mut self, doctor_id: &str, doctor: DoctorRecord) -> Self {
        self.doctors.insert(doctor_id.to_string(), doctor);
        self
    }

    pub fn with_override(mut self, doctor_id: &str, entry: Override) -> Self {
        self.overrides.push(DoctorOverride {
            doctor_id: doctor_id.to_string(),
            entry,
        });
        self
    }

    pub fn with_booking(mut self, doctor_id: &str, booking: Booking) -> Self {
        self.appointments.push(Appointment {
            doctor_id: doctor_id.to_string(),
            booking,
        });
        self
    }
}

impl DoctorDirectory for InMemoryDirectory {
    fn fetch_doctor(&self, doctor_id: &str) -> Result<Option<DoctorRecord>> {
        Ok(self.doctors.get(doctor_id).cloned())
    }

    fn fetch_overrides(&self, doctor_id: &str, window: &Interval) -> Result<Vec<Override>> {
        Ok(self
            .overrides
            .iter()
            .filter(|o| o.doctor_id == doctor_id && o.entry.touches(window))
            .map(|o| o.entry.clone())
            .collect())
    }

    fn fetch_confirmed_bookings(&self, doctor_id: &str, window: &Interval) -> Result<Vec<Booking>> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.booking.is_confirmed())
            .filter(|a| window.start <= a.booking.scheduled_at && a.booking.scheduled_at <= window.end)
            .map(|a| a.booking.clone())
            .collect())
    }
}
