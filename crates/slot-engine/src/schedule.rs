//! Recurring weekly working hours.
//!
//! A [`WeeklySchedule`] is stored exactly as doctors edit it: seven optional day
//! keys (`mon`..`sun`), each holding a list of "HH:MM" shifts in the doctor's
//! local wall-clock time. Shifts are kept as raw strings so a single malformed
//! entry never makes the whole schedule unreadable; they are parsed into
//! [`CivilTime`] bounds on use.

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::civil::CivilTime;
use crate::error::{Result, SlotError};

/// All weekdays in schedule order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A same-day working block, e.g. `{"start": "09:00", "end": "17:00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub start: String,
    pub end: String,
}

impl Shift {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both bounds. Fails if either is not "HH:MM" or `start >= end`.
    pub fn bounds(&self) -> Result<(CivilTime, CivilTime)> {
        let start: CivilTime = self.start.parse()?;
        let end: CivilTime = self.end.parse()?;
        if start >= end {
            return Err(SlotError::InvalidRange(format!(
                "shift start {} is not before end {}",
                start, end
            )));
        }
        Ok((start, end))
    }
}

/// Weekday → shifts. Missing, `null`, and empty days are all days off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub mon: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub tue: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub wed: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub thu: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub fri: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub sat: Vec<Shift>,
    #[serde(default, deserialize_with = "nullable_shifts", skip_serializing_if = "Vec::is_empty")]
    pub sun: Vec<Shift>,
}

fn nullable_shifts<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<Shift>, D::Error> {
    Ok(Option::<Vec<Shift>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The three-letter lowercase key a weekday is stored under ("mon", "tue", ...).
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

impl WeeklySchedule {
    /// Monday to Friday, 09:00–17:00. Offered to doctors who have not yet saved
    /// a schedule of their own.
    pub fn default_working_week() -> Self {
        let day = || vec![Shift::new("09:00", "17:00")];
        Self {
            mon: day(),
            tue: day(),
            wed: day(),
            thu: day(),
            fri: day(),
            ..Self::default()
        }
    }

    pub fn shifts_for(&self, day: Weekday) -> &[Shift] {
        match day {
            Weekday::Mon => &self.mon,
            Weekday::Tue => &self.tue,
            Weekday::Wed => &self.wed,
            Weekday::Thu => &self.thu,
            Weekday::Fri => &self.fri,
            Weekday::Sat => &self.sat,
            Weekday::Sun => &self.sun,
        }
    }

    fn shifts_for_mut(&mut self, day: Weekday) -> &mut Vec<Shift> {
        match day {
            Weekday::Mon => &mut self.mon,
            Weekday::Tue => &mut self.tue,
            Weekday::Wed => &mut self.wed,
            Weekday::Thu => &mut self.thu,
            Weekday::Fri => &mut self.fri,
            Weekday::Sat => &mut self.sat,
            Weekday::Sun => &mut self.sun,
        }
    }

    /// Append a shift to `day`, builder style.
    pub fn with_shift(mut self, day: Weekday, start: &str, end: &str) -> Self {
        self.shifts_for_mut(day).push(Shift::new(start, end));
        self
    }

    /// True when no day has any shift.
    pub fn is_empty(&self) -> bool {
        WEEK.iter().all(|d| self.shifts_for(*d).is_empty())
    }

    /// Check every shift before the schedule is saved.
    ///
    /// Returns every violation found rather than stopping at the first, so the
    /// editing screen can flag all offending rows at once.
    pub fn validate(&self) -> std::result::Result<(), Vec<SlotError>> {
        let errors: Vec<SlotError> = WEEK
            .iter()
            .flat_map(|day| {
                self.shifts_for(*day)
                    .iter()
                    .enumerate()
                    .filter_map(move |(index, shift)| {
                        shift.bounds().err().map(|e| SlotError::InvalidShift {
                            day: weekday_key(*day).to_string(),
                            index,
                            reason: e.to_string(),
                        })
                    })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
