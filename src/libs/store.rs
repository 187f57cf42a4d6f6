//! The record store seen from the attendance core.
//!
//! The core never talks to a database directly. Everything it needs from
//! persistence goes through [`RecordStore`], which the SQLite-backed
//! [`crate::db::activities::Activities`] implements. Implementations must
//! guarantee that
//!
//! - a time-out is applied at most once per record (a second one fails),
//! - at most one open, non-invalidated record exists per account after any
//!   sequence of concurrent opens,
//! - every mutation bumps the owning account's version before it commits.
//!
//! Every mutation fails explicitly with an
//! [`AttendanceError`](crate::libs::error::AttendanceError) instead of doing
//! nothing.

use super::activity::{ActivityRecord, JobReference};
use super::performance::AccountSnapshot;
use anyhow::Result;
use chrono::{DateTime, Utc};

pub trait RecordStore {
    /// Opens a session for `account_id` at `time_in`.
    fn open_record(&self, account_id: &str, job: Option<&JobReference>, time_in: DateTime<Utc>) -> Result<ActivityRecord>;

    /// Records the time-out of an open session.
    fn close_record(&self, id: i64, time_out: DateTime<Utc>) -> Result<ActivityRecord>;

    /// Marks a record invalid as of `at`; `reason` must not be blank.
    fn invalidate_record(&self, id: i64, reason: &str, at: DateTime<Utc>) -> Result<ActivityRecord>;

    /// Closes an open session at `time_out` and invalidates it with `reason`
    /// as of the same instant, in one write. Either both happen or neither.
    fn close_invalidated(&self, id: i64, time_out: DateTime<Utc>, reason: &str) -> Result<ActivityRecord>;

    /// Removes a record permanently and returns what was removed.
    fn delete_record(&self, id: i64) -> Result<ActivityRecord>;

    fn record(&self, id: i64) -> Result<Option<ActivityRecord>>;

    /// The open, non-invalidated record of `account_id`, if any.
    fn open_record_for(&self, account_id: &str) -> Result<Option<ActivityRecord>>;

    /// Records and adjustments of one account read at a single version.
    fn snapshot(&self, account_id: &str) -> Result<AccountSnapshot>;

    /// Current version of `account_id`'s data; 0 before any mutation.
    fn version(&self, account_id: &str) -> Result<u64>;
}
