//! Engine parameters.

use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};

/// Length of one bookable slot, in minutes.
pub const SLOT_MINUTES: i64 = 30;
/// Minimum notice before a slot may be booked, in minutes.
pub const LEAD_TIME_MINUTES: i64 = 10;
/// Number of local calendar days offered, starting today.
pub const HORIZON_DAYS: u32 = 7;
/// How long an existing booking occupies the calendar, in minutes.
pub const BOOKING_MINUTES: i64 = 30;

/// Upper bound for slot and booking lengths: one day.
pub const MAX_LENGTH_MINUTES: i64 = 24 * 60;
/// Upper bound for the horizon: one leap year.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// What to do when overrides or bookings cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Compute slots as if the failed source were empty and report a warning.
    #[default]
    FailOpen,
    /// Offer no slots and report an error.
    FailClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlotEngineConfig {
    pub slot_minutes: i64,
    pub lead_time_minutes: i64,
    pub horizon_days: u32,
    pub booking_minutes: i64,
    pub dst_policy: DstPolicy,
    pub on_fetch_failure: FetchFailurePolicy,
}

impl Default for SlotEngineConfig {
    fn default() -> Self {
        Self {
            slot_minutes: SLOT_MINUTES,
            lead_time_minutes: LEAD_TIME_MINUTES,
            horizon_days: HORIZON_DAYS,
            booking_minutes: BOOKING_MINUTES,
            dst_policy: DstPolicy::default(),
            on_fetch_failure: FetchFailurePolicy::default(),
        }
    }
}

impl SlotEngineConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    ///
    /// Values outside these ranges would overflow chrono's date arithmetic.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LENGTH_MINUTES).contains(&self.slot_minutes) {
            return Err(SlotError::InvalidConfig(format!(
                "slot_minutes must be between 1 and {}",
                MAX_LENGTH_MINUTES
            )));
        }
        if !(1..=MAX_LENGTH_MINUTES).contains(&self.booking_minutes) {
            return Err(SlotError::InvalidConfig(format!(
                "booking_minutes must be between 1 and {}",
                MAX_LENGTH_MINUTES
            )));
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(SlotError::InvalidConfig(format!(
                "horizon_days must be between 1 and {}",
                MAX_HORIZON_DAYS
            )));
        }
        let horizon_minutes = i64::from(self.horizon_days) * 24 * 60;
        if !(0..=horizon_minutes).contains(&self.lead_time_minutes) {
            return Err(SlotError::InvalidConfig(
                "lead_time_minutes must be between 0 and the horizon length".into(),
            ));
        }
        Ok(())
    }
}
