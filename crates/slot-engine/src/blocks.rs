//! Things that take time away from a schedule: doctor overrides (time off) and
//! patient bookings. Both are stored as absolute UTC instants.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::civil::{resolve_local, CivilTime};
use crate::conflict::Interval;
use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};

/// Why a doctor blocked out time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    #[default]
    Vacation,
    Block,
    #[serde(other)]
    Other,
}

/// A doctor-declared block over `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, alias = "type")]
    pub override_type: Option<OverrideType>,
}

impl Override {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
            reason: None,
            override_type: None,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    /// Whether a slot starting at `instant` is blocked by this override.
    pub fn blocks(&self, instant: DateTime<Utc>) -> bool {
        self.interval().contains(instant)
    }

    /// Inclusive window intersection used when selecting overrides to fetch:
    /// `start_time <= window.end && end_time >= window.start`.
    pub fn touches(&self, window: &Interval) -> bool {
        self.start_time <= window.end && self.end_time >= window.start
    }

    /// Build a time-off override from dates and optional times entered in the
    /// doctor's own zone.
    ///
    /// A missing start time means the start of the day (00:00); a missing end
    /// time means the end of the day (23:59:59).
    pub fn time_off(request: &TimeOffRequest, tz: &Tz, policy: DstPolicy) -> Result<Self> {
        let start_local = request
            .start_date
            .and_time(request.start_time.map(|t| t.as_naive()).unwrap_or(NaiveTime::MIN));
        let end_local = request.end_date.and_time(
            request
                .end_time
                .map(|t| t.as_naive())
                .unwrap_or_else(end_of_day),
        );

        let start_time = resolve_local(start_local, tz, policy).ok_or_else(|| {
            SlotError::InvalidTime(format!("{} does not exist in {}", start_local, tz.name()))
        })?;
        let end_time = resolve_local(end_local, tz, policy).ok_or_else(|| {
            SlotError::InvalidTime(format!("{} does not exist in {}", end_local, tz.name()))
        })?;

        if end_time <= start_time {
            return Err(SlotError::InvalidRange(format!(
                "time off ends at {} which is not after its start {}",
                end_local, start_local
            )));
        }

        Ok(Self {
            start_time,
            end_time,
            reason: Some(
                request
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .unwrap_or("Time Off")
                    .to_string(),
            ),
            override_type: Some(OverrideType::Vacation),
        })
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Time off as the doctor enters it: local dates with optional times of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<CivilTime>,
    #[serde(default)]
    pub end_time: Option<CivilTime>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Appointment lifecycle states. Only `Confirmed` holds a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// The slot-relevant fields of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Booking {
    pub fn confirmed(scheduled_at: DateTime<Utc>) -> Self {
        Self {
            scheduled_at,
            status: BookingStatus::Confirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    /// The time this booking occupies, `[scheduled_at, scheduled_at + minutes)`.
    pub fn interval(&self, minutes: i64) -> Interval {
        Interval::starting_at(self.scheduled_at, minutes)
    }
}
