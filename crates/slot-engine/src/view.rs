//! The doctor's own calendar: free slots and confirmed bookings on one timeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::blocks::Booking;
use crate::civil::iso_millis;
use crate::config::SlotEngineConfig;
use crate::conflict::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Booked,
    Available,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(with = "iso_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub end: DateTime<Utc>,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub entries: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Merge free slots with the confirmed bookings that start inside `window`.
///
/// Entries are sorted by start; on a tie a booking sorts before a free slot.
pub fn merge_schedule_view(
    slots: &[DateTime<Utc>],
    bookings: &[Booking],
    window: &Interval,
    config: &SlotEngineConfig,
) -> Vec<ScheduleEntry> {
    let free = slots.iter().map(|start| ScheduleEntry {
        start: *start,
        end: *start + Duration::minutes(config.slot_minutes),
        kind: EntryKind::Available,
    });

    let booked = bookings
        .iter()
        .filter(|b| b.is_confirmed())
        .filter(|b| window.start <= b.scheduled_at && b.scheduled_at <= window.end)
        .map(|b| {
            let occupied = b.interval(config.booking_minutes);
            ScheduleEntry {
                start: occupied.start,
                end: occupied.end,
                kind: EntryKind::Booked,
            }
        });

    let mut entries: Vec<ScheduleEntry> = free.chain(booked).collect();
    entries.sort_by_key(|e| (e.start, e.kind));
    entries
}
