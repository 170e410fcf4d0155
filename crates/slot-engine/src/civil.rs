//! Civil (wall-clock) time and its conversion to absolute instants.
//!
//! Weekly schedules are written in the doctor's local wall-clock time, while
//! bookings and overrides are stored as UTC instants. The two never meet except
//! through [`to_instant`], which resolves a local date plus a [`CivilTime`] in a
//! given IANA zone to a `DateTime<Utc>`.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};

/// Longest DST gap searched when shifting forward. Real-world gaps are at most
/// two hours; this leaves headroom for historical zone changes.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// A zone-less wall-clock time of day with minute precision ("HH:MM").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilTime(NaiveTime);

impl CivilTime {
    /// Build from hour and minute. Returns `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Combine with a local calendar date into a zone-less local datetime.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    /// Add `minutes`, or `None` if the result would pass midnight.
    pub fn checked_add_minutes(&self, minutes: i64) -> Option<Self> {
        let step = Duration::try_minutes(minutes)?;
        match self.0.overflowing_add_signed(step) {
            (next, 0) if minutes >= 0 => Some(Self(next)),
            _ => None,
        }
    }
}

impl FromStr for CivilTime {
    type Err = SlotError;

    /// Accepts "HH:MM" and, for values coming from SQL `time` columns, "HH:MM:SS".
    /// Seconds are truncated.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| SlotError::InvalidTime(format!("'{}' is not HH:MM", s)))?;
        CivilTime::from_hm(parsed.hour(), parsed.minute())
            .ok_or_else(|| SlotError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for CivilTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CivilTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolve a local date and wall-clock time in `tz` to an absolute instant.
///
/// - Unambiguous times map to their single instant.
/// - Ambiguous times (clocks falling back) map to the earlier instant.
/// - Non-existent times (clocks springing forward) follow `policy`; only
///   [`DstPolicy::Skip`] yields `None`.
pub fn to_instant(
    date: NaiveDate,
    time: CivilTime,
    tz: &Tz,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    resolve_local(time.on(date), tz, policy)
}

/// Resolve a zone-less local datetime in `tz` to an absolute instant, using the
/// same rules as [`to_instant`].
pub(crate) fn resolve_local(
    local: NaiveDateTime,
    tz: &Tz,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => resolve_gap(local, tz, policy),
    }
}

fn resolve_gap(local: NaiveDateTime, tz: &Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match policy {
        DstPolicy::Skip => None,
        DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES).find_map(|m| {
            tz.from_local_datetime(&(local + Duration::minutes(m)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }),
        DstPolicy::WallClock => {
            // Zones never transition twice within a day, so the offset a day
            // earlier is the one in effect just before the gap.
            let before = tz
                .from_local_datetime(&(local - Duration::days(1)))
                .earliest()?;
            let offset = before.offset().fix().local_minus_utc();
            Some((local - Duration::seconds(i64::from(offset))).and_utc())
        }
    }
}

/// Resolve a doctor's zone name. Missing or blank names fall back to UTC.
pub fn resolve_timezone(name: Option<&str>) -> Result<Tz> {
    match name.map(str::trim) {
        None | Some("") => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| SlotError::InvalidTimezone(name.to_string())),
    }
}

/// Format an instant as ISO 8601 UTC with millisecond precision
/// (e.g., "2024-01-01T09:00:00.000Z").
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO 8601 datetime into `DateTime<Utc>`.
///
/// Accepts RFC 3339 with any offset, and naive "YYYY-MM-DDTHH:MM:SS", which is
/// interpreted as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| SlotError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Serde adapter writing instants in the [`format_instant`] shape and reading
/// anything [`parse_instant`] accepts.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_instant(instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(serde::de::Error::custom)
    }
}
