//! DST transition policies for wall-clock schedule times.

use serde::{Deserialize, Serialize};

/// Policy for wall-clock times that do not exist on a given date because the
/// clocks spring forward (e.g., 02:30 in New York on the second Sunday of March).
///
/// Times that exist twice (fall back) always resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop times that fall in the gap.
    Skip,
    /// Move to the first valid wall-clock time after the gap.
    ShiftForward,
    /// Keep the wall-clock reading and apply the UTC offset in effect before
    /// the gap, so 02:30 EST-that-never-was becomes 03:30 EDT.
    #[default]
    WallClock,
}
