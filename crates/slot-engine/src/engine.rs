//! Bookable slot computation.
//!
//! For each of the next `horizon_days` local calendar days in the doctor's
//! zone, every shift of that weekday is sliced into fixed-length wall-clock
//! slots and each slot is resolved to a UTC instant. Slots are then dropped
//! when they start too soon or are blocked by time off or a booking.
//!
//! The computation is pure: inputs in, sorted instants out.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blocks::{Booking, Override};
use crate::civil::{resolve_timezone, to_instant, CivilTime};
use crate::config::SlotEngineConfig;
use crate::conflict::{first_conflict, Interval};
use crate::error::{Result, SlotError};
use crate::schedule::{weekday_key, Shift, WeeklySchedule};

/// The absolute window `[now, now + horizon_days)` that overrides and bookings
/// are fetched for.
pub fn query_window(now: DateTime<Utc>, config: &SlotEngineConfig) -> Interval {
    Interval::new(now, now + Duration::days(i64::from(config.horizon_days)))
}

/// The local calendar dates covered, starting with today as seen in `tz`.
///
/// Days are counted on the local calendar rather than by adding 24 hours to
/// `now`, so a DST change can neither repeat nor skip a date.
pub fn local_days(now: DateTime<Utc>, tz: &Tz, horizon_days: u32) -> Vec<NaiveDate> {
    let today = now.with_timezone(tz).date_naive();
    (0..u64::from(horizon_days))
        .filter_map(|i| today.checked_add_days(Days::new(i)))
        .collect()
}

/// Slice one shift into wall-clock slot starts.
///
/// Only whole slots are produced: a slot is kept when it ends at or before the
/// shift end, so a shift of D minutes yields `floor(D / slot_minutes)` starts.
/// This deliberately differs from slicing every start before the shift end:
/// 09:00-09:45 gives one slot here, not two.
///
/// # Errors
/// Returns the parse or range error of a malformed shift, or
/// `SlotError::InvalidConfig` for a non-positive slot length.
pub fn shift_slots(shift: &Shift, slot_minutes: i64) -> Result<Vec<CivilTime>> {
    if slot_minutes <= 0 {
        return Err(SlotError::InvalidConfig("slot_minutes must be positive".into()));
    }
    let (start, end) = shift.bounds()?;

    let mut starts = Vec::new();
    let mut slot = start;
    while let Some(slot_end) = slot.checked_add_minutes(slot_minutes) {
        if slot_end > end {
            break;
        }
        starts.push(slot);
        slot = slot_end;
    }
    Ok(starts)
}

/// Compute bookable slot starts for the window beginning at `now`.
///
/// A candidate slot is discarded when:
/// 1. it starts before `now + lead_time_minutes`;
/// 2. its start lies inside any override's `[start_time, end_time)`;
/// 3. `[slot, slot + slot_minutes)` overlaps any confirmed booking's
///    `[scheduled_at, scheduled_at + booking_minutes)`;
/// 4. it ends after [`query_window`], the range blocks are fetched for. In a
///    week where the zone falls back, the last local day runs past it.
///
/// Malformed shifts are skipped with a warning; the rest of the week is still
/// computed. The result is sorted and free of duplicates.
///
/// `config` is expected to have passed [`SlotEngineConfig::validate`].
pub fn compute_available_slots(
    schedule: &WeeklySchedule,
    tz: &Tz,
    overrides: &[Override],
    bookings: &[Booking],
    now: DateTime<Utc>,
    config: &SlotEngineConfig,
) -> Vec<DateTime<Utc>> {
    let earliest = now + Duration::minutes(config.lead_time_minutes);
    let horizon = query_window(now, config);

    let busy: Vec<Interval> = bookings
        .iter()
        .filter(|b| b.is_confirmed())
        .map(|b| b.interval(config.booking_minutes))
        .collect();

    let mut slots = Vec::new();

    for date in local_days(now, tz, config.horizon_days) {
        let weekday = date.weekday();

        for (index, shift) in schedule.shifts_for(weekday).iter().enumerate() {
            let starts = match shift_slots(shift, config.slot_minutes) {
                Ok(starts) => starts,
                Err(e) => {
                    warn!(day = weekday_key(weekday), index, error = %e, "skipping malformed shift");
                    continue;
                }
            };

            for local in starts {
                let Some(slot) = to_instant(date, local, tz, config.dst_policy) else {
                    debug!(%date, %local, zone = tz.name(), "slot falls in a DST gap; skipped");
                    continue;
                };

                if slot < earliest {
                    continue;
                }

                let window = Interval::starting_at(slot, config.slot_minutes);
                if window.end > horizon.end {
                    continue;
                }

                if overrides.iter().any(|o| o.blocks(slot)) {
                    continue;
                }

                if first_conflict(&window, &busy).is_some() {
                    continue;
                }

                slots.push(slot);
            }
        }
    }

    // Gap resolution can map two wall-clock times onto the same instant.
    slots.sort();
    slots.dedup();

    debug!(
        zone = tz.name(),
        slots = slots.len(),
        overrides = overrides.len(),
        bookings = busy.len(),
        "computed available slots"
    );

    slots
}

/// Everything the engine needs about one doctor, in its stored JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotQuery {
    #[serde(default)]
    pub weekly_schedule: Option<WeeklySchedule>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub overrides: Vec<Override>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl SlotQuery {
    /// Resolve the zone (UTC when absent) and run [`compute_available_slots`].
    ///
    /// # Errors
    /// Returns `SlotError::InvalidConfig` for a config that fails validation and
    /// `SlotError::InvalidTimezone` if `time_zone` is not an IANA name.
    pub fn compute(&self, now: DateTime<Utc>, config: &SlotEngineConfig) -> Result<Vec<DateTime<Utc>>> {
        config.validate()?;
        let tz = resolve_timezone(self.time_zone.as_deref())?;
        let empty = WeeklySchedule::default();
        let schedule = self.weekly_schedule.as_ref().unwrap_or(&empty);
        Ok(compute_available_slots(
            schedule,
            &tz,
            &self.overrides,
            &self.bookings,
            now,
            config,
        ))
    }
}
