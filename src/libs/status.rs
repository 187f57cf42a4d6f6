//! Status classification for activity records.
//!
//! [`classify`] is the one place that decides what state a record is in. The
//! per-row views, the overdue counter and the performance aggregation all
//! call it, so they can never disagree.
//!
//! ## Rules
//!
//! Evaluated in order, the first match wins:
//!
//! 1. `invalidated_at` is set → [`ActivityStatus::Invalidated`]
//! 2. `time_out` is set → [`ActivityStatus::Completed`]
//! 3. the record is open:
//!    - opened on the same local calendar day as `now` **and** less than
//!      24 hours ago → [`ActivityStatus::Active`]
//!    - otherwise → [`ActivityStatus::Overdue`]
//!
//! The calendar day is taken in the time zone of `now`. Both conditions are
//! kept on purpose: a session opened at 23:59 and checked at 00:01 is already
//! overdue even though only two minutes have passed.
//!
//! ```rust
//! use chrono::{FixedOffset, TimeZone, Utc};
//! use clockin::libs::activity::ActivityRecord;
//! use clockin::libs::status::{classify, ActivityStatus};
//!
//! let tz = FixedOffset::east_opt(8 * 3600).unwrap();
//! let time_in = tz.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap().with_timezone(&Utc);
//! let record = ActivityRecord::open(1, "42", "Ada", None, time_in);
//!
//! let now = tz.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
//! assert_eq!(classify(&record, &now), ActivityStatus::Active);
//! ```

use super::activity::ActivityRecord;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

/// Hours after which an open record can no longer be active.
pub const STALE_AFTER_HOURS: i64 = 24;

/// Derived state of an activity record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// Excluded from status and totals, kept for audit
    Invalidated,
    /// Open, opened today and within the staleness bound
    Active,
    /// Open, but from a previous day or older than the staleness bound
    Overdue,
    /// Closed by a time-out
    Completed,
}

impl ActivityStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityStatus::Invalidated => "Invalidated",
            ActivityStatus::Active => "Active",
            ActivityStatus::Overdue => "Overdue",
            ActivityStatus::Completed => "Completed",
        }
    }

    /// `true` for the two states of a record without a time-out.
    pub fn is_open(&self) -> bool {
        matches!(self, ActivityStatus::Active | ActivityStatus::Overdue)
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies `record` as of `now`.
pub fn classify<Tz: TimeZone>(record: &ActivityRecord, now: &DateTime<Tz>) -> ActivityStatus {
    if record.invalidated_at.is_some() {
        return ActivityStatus::Invalidated;
    }
    if record.time_out.is_some() {
        return ActivityStatus::Completed;
    }

    let local_time_in = record.time_in.with_timezone(&now.timezone());
    let same_calendar_day = local_time_in.date_naive() == now.date_naive();
    let elapsed = now.with_timezone(&Utc) - record.time_in;

    if same_calendar_day && elapsed < Duration::hours(STALE_AFTER_HOURS) {
        ActivityStatus::Active
    } else {
        ActivityStatus::Overdue
    }
}

/// Number of records that are overdue at `now`.
pub fn count_overdue<Tz: TimeZone>(records: &[ActivityRecord], now: &DateTime<Tz>) -> usize {
    records
        .iter()
        .filter(|record| classify(record, now) == ActivityStatus::Overdue)
        .count()
}
