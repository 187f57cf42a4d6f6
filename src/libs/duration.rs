//! Duration derivation for activity records.
//!
//! Durations are always derived from the canonical timestamps and are never
//! stored. A closed record has an authoritative duration in whole minutes;
//! an open record only has a provisional "so far" value that callers must
//! ask for explicitly by passing `now`.

use super::activity::ActivityRecord;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Duration of a record as presented to callers.
///
/// `Unavailable` is distinct from `Final(0)`: it means no meaningful
/// duration can be derived from the timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "lowercase")]
pub enum RecordDuration {
    /// Closed record, whole minutes between time-in and time-out
    Final(i64),
    /// Open record, whole minutes elapsed so far; not persisted anywhere
    Provisional(i64),
    Unavailable,
}

impl RecordDuration {
    pub fn minutes(&self) -> Option<i64> {
        match self {
            RecordDuration::Final(minutes) | RecordDuration::Provisional(minutes) => Some(*minutes),
            RecordDuration::Unavailable => None,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, RecordDuration::Provisional(_))
    }
}

/// Authoritative duration of a closed record in whole minutes.
///
/// Returns `None` for open records, and for stored data whose time-out does
/// not follow its time-in. Partial minutes are truncated.
pub fn duration_minutes(record: &ActivityRecord) -> Option<i64> {
    let time_out = record.time_out?;
    non_negative_minutes(record.time_in, time_out)
}

/// Duration of a record for display as of `now`.
pub fn record_duration<Tz: TimeZone>(record: &ActivityRecord, now: &DateTime<Tz>) -> RecordDuration {
    match record.time_out {
        Some(_) => duration_minutes(record).map_or(RecordDuration::Unavailable, RecordDuration::Final),
        // An invalidated session that was never closed has nothing to measure.
        None if record.is_invalidated() => RecordDuration::Unavailable,
        None => non_negative_minutes(record.time_in, now.with_timezone(&Utc))
            .map_or(RecordDuration::Unavailable, RecordDuration::Provisional),
    }
}

fn non_negative_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<i64> {
    let minutes = (end - start).num_minutes();
    (end >= start).then_some(minutes)
}

/// Hours/minutes split of a duration, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub hours: i64,
    pub minutes: i64,
}

impl DurationParts {
    /// `hours = floor(m / 60)`, `minutes = m mod 60`.
    pub fn from_minutes(total_minutes: i64) -> Self {
        Self {
            hours: total_minutes.div_euclid(60),
            minutes: total_minutes.rem_euclid(60),
        }
    }

    /// Splits fractional hours, rounding the remainder to the nearest minute.
    pub fn from_hours(hours: f64) -> Self {
        let total_minutes = hours * 60.0;
        let mut whole_hours = (total_minutes / 60.0).floor() as i64;
        let mut minutes = total_minutes.rem_euclid(60.0).round() as i64;
        if minutes == 60 {
            whole_hours += 1;
            minutes = 0;
        }
        Self {
            hours: whole_hours,
            minutes,
        }
    }
}
