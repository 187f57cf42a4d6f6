//! Clock-in/clock-out activity records.
//!
//! An [`ActivityRecord`] is one attendance session: it is opened by a time-in
//! punch, closed exactly once by a time-out punch, and may be invalidated by
//! an administrator. Durations and statuses are never stored on the record;
//! they are derived on every read by [`crate::libs::duration`] and
//! [`crate::libs::status`].
//!
//! ## Lifecycle
//!
//! ```text
//! open ──time out──▶ completed
//!   │                    │
//!   └──── invalidate ────┴──▶ invalidated (terminal)
//!
//! any state ──delete──▶ removed (terminal)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use clockin::libs::activity::{ActivityRecord, JobReference};
//!
//! let time_in = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
//! let record = ActivityRecord::open(1, "42", "Ada Lovelace", Some(JobReference::new(3, "Library")), time_in);
//! assert!(record.is_open());
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Job or assignment an activity was clocked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReference {
    pub id: i64,
    pub name: String,
}

impl JobReference {
    pub fn new(id: i64, name: &str) -> Self {
        Self { id, name: name.to_string() }
    }
}

/// A single clock-in/clock-out session.
///
/// `time_in` and the owning account never change after creation. `time_out`
/// is written once, by the matching time-out action or by invalidation of an
/// open record. Once `invalidated_at` is set the record is kept for audit
/// only and contributes nothing to status or totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// Store-assigned identifier
    pub id: i64,

    /// Owning person
    pub account_id: String,

    /// Display name of the owner at read time
    pub account_name: String,

    /// Job the session was clocked against, if any
    pub job: Option<JobReference>,

    /// Clock-in instant
    pub time_in: DateTime<Utc>,

    /// Clock-out instant, `None` while the session is open
    pub time_out: Option<DateTime<Utc>>,

    /// When the record was invalidated
    pub invalidated_at: Option<DateTime<Utc>>,

    /// Reason given for the invalidation
    pub invalidation_notes: Option<String>,

    /// Closed by the nightly auto-close job rather than by a punch
    pub auto_closed: bool,

    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Builds a freshly opened record, as written by a time-in action.
    pub fn open(id: i64, account_id: &str, account_name: &str, job: Option<JobReference>, time_in: DateTime<Utc>) -> Self {
        Self {
            id,
            account_id: account_id.to_string(),
            account_name: account_name.to_string(),
            job,
            time_in,
            time_out: None,
            invalidated_at: None,
            invalidation_notes: None,
            auto_closed: false,
            created_at: time_in,
        }
    }

    /// Returns a copy closed at `time_out`.
    pub fn closed_at(mut self, time_out: DateTime<Utc>) -> Self {
        self.time_out = Some(time_out);
        self
    }

    /// Returns a copy invalidated at `at` with the given reason.
    pub fn invalidated(mut self, at: DateTime<Utc>, notes: &str) -> Self {
        self.invalidated_at = Some(at);
        self.invalidation_notes = Some(notes.to_string());
        self
    }

    /// `true` while no time-out has been recorded.
    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated_at.is_some()
    }

    /// `true` for a record that is open and still counts toward status.
    pub fn is_live(&self) -> bool {
        self.is_open() && !self.is_invalidated()
    }

    pub fn job_name(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.name.as_str())
    }
}
