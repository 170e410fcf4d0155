//! Half-open time intervals and overlap tests.
//!
//! All intervals are `[start, end)`. Adjacent intervals (one ends exactly when
//! the other starts) do NOT overlap, so back-to-back appointments never block
//! each other.

use chrono::{DateTime, Duration, Utc};

/// An absolute `[start, end)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The interval of `minutes` length beginning at `start`.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    /// `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Return the first interval in `busy` that overlaps `candidate`, if any.
pub fn first_conflict<'a>(candidate: &Interval, busy: &'a [Interval]) -> Option<&'a Interval> {
    busy.iter().find(|b| candidate.overlaps(b))
}
