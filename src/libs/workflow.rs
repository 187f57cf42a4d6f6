//! Attendance workflows on top of a [`RecordStore`].
//!
//! These functions tie the pure core (classification, durations,
//! aggregation) to the store's mutations: the punch toggle used at the kiosk,
//! invalidation and deletion that keep the performance cache honest, and the
//! nightly auto-close cutoff.
//!
//! [`invalidate`] and [`delete`] are the entry points for callers that keep
//! a [`PerformanceCache`] across mutations. One-shot callers such as the CLI
//! hold no cache and may use the store's bulk operations directly: every
//! store mutation bumps the account version, and a cache fed a newer
//! snapshot recomputes.

use super::account::Account;
use super::activity::ActivityRecord;
use super::duration::duration_minutes;
use super::error::{AttendanceError, ValidationError};
use super::performance::{PerformanceCache, PerformanceStat};
use super::status::{classify, ActivityStatus};
use super::store::RecordStore;
use anyhow::Result;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use tracing::{debug, warn};

/// How many times a stale snapshot is re-read before giving up.
const MAX_STALE_RETRIES: usize = 1;

/// What a punch did.
#[derive(Debug, Clone, PartialEq)]
pub enum PunchOutcome {
    TimedIn(ActivityRecord),
    TimedOut(ActivityRecord),
    /// Forced time-out of a session shorter than the minimum; the record is
    /// closed and invalidated.
    TimedOutEarly(ActivityRecord),
}

impl PunchOutcome {
    pub fn record(&self) -> &ActivityRecord {
        match self {
            PunchOutcome::TimedIn(r) | PunchOutcome::TimedOut(r) | PunchOutcome::TimedOutEarly(r) => r,
        }
    }
}

/// Note stored on sessions force-closed before the minimum length.
pub fn early_timeout_note(minimum: i64) -> String {
    format!("Timed out too early (< {} mins)", minimum)
}

/// Times `account` in, or out if they have an active session.
///
/// - No open session: opens one on the account's job. An account without a
///   job is refused.
/// - Active session: closes it at `now`. A session shorter than
///   `min_session_minutes` is refused unless `force`, in which case it is
///   closed and invalidated.
/// - Overdue session: refused; it has to be closed or invalidated first.
pub fn punch<S, Tz>(store: &S, account: &Account, min_session_minutes: i64, now: &DateTime<Tz>, force: bool) -> Result<PunchOutcome>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let now_utc = now.with_timezone(&Utc);

    let Some(open) = store.open_record_for(&account.id)? else {
        let job = account
            .job
            .as_ref()
            .ok_or_else(|| AttendanceError::from(ValidationError::NoJobAssigned(account.id.clone())))?;
        let record = store.open_record(&account.id, Some(job), now_utc)?;
        return Ok(PunchOutcome::TimedIn(record));
    };

    if classify(&open, now) == ActivityStatus::Overdue {
        return Err(AttendanceError::from(ValidationError::OverdueSessionPending {
            account_id: account.id.clone(),
            open_id: open.id,
        })
        .into());
    }

    let elapsed = (now_utc - open.time_in).num_minutes();
    if elapsed < min_session_minutes {
        if !force {
            return Err(AttendanceError::from(ValidationError::EarlyTimeout {
                minutes: elapsed,
                minimum: min_session_minutes,
            })
            .into());
        }
        let record = store.close_invalidated(open.id, now_utc, &early_timeout_note(min_session_minutes))?;
        return Ok(PunchOutcome::TimedOutEarly(record));
    }

    let record = store.close_record(open.id, now_utc)?;
    Ok(PunchOutcome::TimedOut(record))
}

/// Performance of one account, served from `cache` when it is current.
///
/// A snapshot older than what the cache has seen is re-read; if the store
/// keeps moving the error is returned rather than stale numbers.
pub fn performance_for<S, Tz>(store: &S, cache: &mut PerformanceCache, account: &Account, now: &DateTime<Tz>) -> Result<PerformanceStat>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let mut attempt = 0;
    loop {
        let snapshot = store.snapshot(&account.id)?;
        match cache.stat(account, &snapshot, now) {
            Ok(stat) => return Ok(stat),
            Err(AttendanceError::StaleData { seen, current, .. }) if attempt < MAX_STALE_RETRIES => {
                warn!(account_id = %account.id, seen, current, "stale snapshot, refetching");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Invalidates a record and drops the owner's cached totals. Snapshots
/// taken before the invalidation are refused afterwards.
pub fn invalidate<S>(store: &S, cache: &mut PerformanceCache, id: i64, reason: &str, at: DateTime<Utc>) -> Result<ActivityRecord>
where
    S: RecordStore + ?Sized,
{
    let record = store.invalidate_record(id, reason, at)?;
    let version = store.version(&record.account_id)?;
    cache.invalidate(&record.account_id, version);
    debug!(id, account_id = %record.account_id, version, "dropped cached performance");
    Ok(record)
}

/// Deletes a record and drops the owner's cached totals. Snapshots taken
/// before the deletion are refused afterwards.
pub fn delete<S>(store: &S, cache: &mut PerformanceCache, id: i64) -> Result<ActivityRecord>
where
    S: RecordStore + ?Sized,
{
    let record = store.delete_record(id)?;
    let version = store.version(&record.account_id)?;
    cache.invalidate(&record.account_id, version);
    debug!(id, account_id = %record.account_id, version, "dropped cached performance");
    Ok(record)
}

/// The most recent `hour:00` local cutoff that is not after `now`.
///
/// Returns `None` for an hour outside 0-23.
pub fn auto_close_cutoff<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Option<DateTime<Utc>> {
    let cutoff_time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    let today = now.date_naive();
    let tz = now.timezone();

    let today_cutoff = tz.from_local_datetime(&today.and_time(cutoff_time)).earliest()?;
    let cutoff = if today_cutoff <= *now {
        today_cutoff
    } else {
        let yesterday = today.checked_sub_days(Days::new(1))?;
        tz.from_local_datetime(&yesterday.and_time(cutoff_time)).earliest()?
    };
    Some(cutoff.with_timezone(&Utc))
}

/// Per-account session counts and completed minutes within a date range.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AttendanceSummary {
    pub account_id: String,
    pub name: String,
    pub sessions: usize,
    pub completed_minutes: i64,
}

/// Summarises non-invalidated records per account, most minutes first.
pub fn summarize(records: &[ActivityRecord]) -> Vec<AttendanceSummary> {
    let mut summaries: Vec<AttendanceSummary> = Vec::new();

    for record in records.iter().filter(|r| !r.is_invalidated()) {
        let index = match summaries.iter().position(|s| s.account_id == record.account_id) {
            Some(index) => index,
            None => {
                summaries.push(AttendanceSummary {
                    account_id: record.account_id.clone(),
                    name: record.account_name.clone(),
                    sessions: 0,
                    completed_minutes: 0,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[index];
        summary.sessions += 1;
        // Open sessions count as sessions but add no minutes.
        if let Some(minutes) = duration_minutes(record) {
            summary.completed_minutes += minutes;
        }
    }

    summaries.sort_by(|a, b| b.completed_minutes.cmp(&a.completed_minutes).then_with(|| a.name.cmp(&b.name)));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::activity::JobReference;
    use crate::libs::performance::AccountSnapshot;
    use chrono::{Duration, FixedOffset};
    use std::cell::{Cell, RefCell};

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
    }

    fn worker() -> Account {
        Account::new("7", "2020-0007", "Grace").with_job(JobReference::new(3, "Library Aide"))
    }

    /// In-memory store; `snapshot` can be told to return an older version a
    /// few times, or a snapshot captured earlier, and writes can be made to
    /// fail.
    #[derive(Default)]
    struct MemoryStore {
        records: RefCell<Vec<ActivityRecord>>,
        version: Cell<u64>,
        stale_reads: Cell<usize>,
        lagging: RefCell<Option<AccountSnapshot>>,
        fail_writes: Cell<bool>,
    }

    impl MemoryStore {
        fn bump(&self) {
            self.version.set(self.version.get() + 1);
        }

        fn find(&self, id: i64) -> Result<ActivityRecord> {
            self.records
                .borrow()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| AttendanceError::activity_not_found(id).into())
        }

        fn replace(&self, record: ActivityRecord) {
            let mut records = self.records.borrow_mut();
            if let Some(slot) = records.iter_mut().find(|r| r.id == record.id) {
                *slot = record;
            }
        }
    }

    impl RecordStore for MemoryStore {
        fn open_record(&self, account_id: &str, job: Option<&JobReference>, time_in: DateTime<Utc>) -> Result<ActivityRecord> {
            if let Some(open) = self.open_record_for(account_id)? {
                return Err(AttendanceError::from(ValidationError::AlreadyOpen {
                    account_id: account_id.to_string(),
                    open_id: open.id,
                })
                .into());
            }
            let id = self.records.borrow().len() as i64 + 1;
            let record = ActivityRecord::open(id, account_id, "Grace", job.cloned(), time_in);
            self.records.borrow_mut().push(record.clone());
            self.bump();
            Ok(record)
        }

        fn close_record(&self, id: i64, time_out: DateTime<Utc>) -> Result<ActivityRecord> {
            let record = self.find(id)?;
            if record.time_out.is_some() {
                return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
            }
            let record = record.closed_at(time_out);
            self.replace(record.clone());
            self.bump();
            Ok(record)
        }

        fn invalidate_record(&self, id: i64, reason: &str, at: DateTime<Utc>) -> Result<ActivityRecord> {
            if reason.trim().is_empty() {
                return Err(AttendanceError::from(ValidationError::MissingReason).into());
            }
            let record = self.find(id)?.invalidated(at, reason);
            self.replace(record.clone());
            self.bump();
            Ok(record)
        }

        fn close_invalidated(&self, id: i64, time_out: DateTime<Utc>, reason: &str) -> Result<ActivityRecord> {
            let record = self.find(id)?;
            if self.fail_writes.get() {
                anyhow::bail!("disk I/O error");
            }
            if record.time_out.is_some() {
                return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
            }
            let record = record.closed_at(time_out).invalidated(time_out, reason);
            self.replace(record.clone());
            self.bump();
            Ok(record)
        }

        fn delete_record(&self, id: i64) -> Result<ActivityRecord> {
            let record = self.find(id)?;
            self.records.borrow_mut().retain(|r| r.id != id);
            self.bump();
            Ok(record)
        }

        fn record(&self, id: i64) -> Result<Option<ActivityRecord>> {
            Ok(self.records.borrow().iter().find(|r| r.id == id).cloned())
        }

        fn open_record_for(&self, account_id: &str) -> Result<Option<ActivityRecord>> {
            Ok(self
                .records
                .borrow()
                .iter()
                .find(|r| r.account_id == account_id && r.is_live())
                .cloned())
        }

        fn snapshot(&self, account_id: &str) -> Result<AccountSnapshot> {
            if let Some(lagging) = self.lagging.borrow_mut().take() {
                return Ok(lagging);
            }
            let mut version = self.version.get();
            if self.stale_reads.get() > 0 {
                self.stale_reads.set(self.stale_reads.get() - 1);
                version = 0;
            }
            Ok(AccountSnapshot {
                account_id: account_id.to_string(),
                version,
                records: self.records.borrow().clone(),
                adjustment_minutes: 0,
            })
        }

        fn version(&self, _account_id: &str) -> Result<u64> {
            Ok(self.version.get())
        }
    }

    fn validation_of(err: &anyhow::Error) -> Option<ValidationError> {
        err.downcast_ref::<AttendanceError>()
            .and_then(|e| e.validation())
            .cloned()
    }

    #[test]
    fn test_punch_toggles_in_and_out() {
        let store = MemoryStore::default();
        let account = worker();

        let first = punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();
        assert!(matches!(first, PunchOutcome::TimedIn(_)));
        assert_eq!(first.record().job_name(), Some("Library Aide"));

        let second = punch(&store, &account, 10, &at(4, 12, 0), false).unwrap();
        let PunchOutcome::TimedOut(record) = second else {
            panic!("expected a time-out");
        };
        assert_eq!(duration_minutes(&record), Some(240));
    }

    #[test]
    fn test_punch_without_job_is_refused() {
        let store = MemoryStore::default();
        let account = Account::new("8", "2020-0008", "Linus");

        let err = punch(&store, &account, 10, &at(4, 8, 0), false).unwrap_err();
        assert_eq!(validation_of(&err), Some(ValidationError::NoJobAssigned("8".to_string())));
        assert!(store.records.borrow().is_empty());
    }

    #[test]
    fn test_early_timeout_requires_force() {
        let store = MemoryStore::default();
        let account = worker();
        punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();

        let err = punch(&store, &account, 10, &at(4, 8, 5), false).unwrap_err();
        assert_eq!(validation_of(&err), Some(ValidationError::EarlyTimeout { minutes: 5, minimum: 10 }));

        let forced = punch(&store, &account, 10, &at(4, 8, 5), true).unwrap();
        let PunchOutcome::TimedOutEarly(record) = forced else {
            panic!("expected an early time-out");
        };
        assert!(record.is_invalidated());
        assert_eq!(record.invalidation_notes.as_deref(), Some("Timed out too early (< 10 mins)"));
        assert_eq!(classify(&record, &at(4, 8, 5)), ActivityStatus::Invalidated);
    }

    #[test]
    fn test_failed_forced_timeout_leaves_session_untouched() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();
        punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();

        store.fail_writes.set(true);
        assert!(punch(&store, &account, 10, &at(4, 8, 5), true).is_err());

        let open = store.open_record_for("7").unwrap().unwrap();
        assert_eq!(open.time_out, None);
        assert!(!open.is_invalidated());
        let stat = performance_for(&store, &mut cache, &account, &at(4, 8, 6)).unwrap();
        assert_eq!(stat.total_rendered_hours, 0.0);
        assert!(stat.is_online);
    }

    #[test]
    fn test_overdue_session_blocks_punch() {
        let store = MemoryStore::default();
        let account = worker();
        punch(&store, &account, 10, &at(4, 22, 0), false).unwrap();

        let err = punch(&store, &account, 10, &at(5, 7, 0), false).unwrap_err();
        assert_eq!(
            validation_of(&err),
            Some(ValidationError::OverdueSessionPending {
                account_id: "7".to_string(),
                open_id: 1
            })
        );
    }

    #[test]
    fn test_stale_snapshot_is_refetched_once() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();

        punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();
        punch(&store, &account, 10, &at(4, 17, 0), false).unwrap();
        let stat = performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap();
        assert_eq!(stat.total_rendered_hours, 9.0);

        store.stale_reads.set(1);
        let stat = performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap();
        assert_eq!(stat.total_rendered_hours, 9.0);

        store.stale_reads.set(2);
        let err = performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AttendanceError>(),
            Some(AttendanceError::StaleData { .. })
        ));
    }

    #[test]
    fn test_delete_of_active_record_takes_account_offline() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();

        let opened = punch(&store, &account, 10, &at(4, 9, 0), false).unwrap();
        assert!(performance_for(&store, &mut cache, &account, &at(4, 10, 0)).unwrap().is_online);

        delete(&store, &mut cache, opened.record().id).unwrap();
        let stat = performance_for(&store, &mut cache, &account, &at(4, 10, 0)).unwrap();
        assert!(!stat.is_online);
        assert_eq!(stat.total_rendered_hours, 0.0);
    }

    #[test]
    fn test_invalidated_record_leaves_totals() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();

        punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();
        let closed = punch(&store, &account, 10, &at(4, 17, 0), false).unwrap();
        assert_eq!(performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap().total_rendered_hours, 9.0);

        let err = invalidate(&store, &mut cache, closed.record().id, "  ", at(4, 18, 0).with_timezone(&Utc)).unwrap_err();
        assert_eq!(validation_of(&err), Some(ValidationError::MissingReason));

        invalidate(&store, &mut cache, closed.record().id, "duplicate entry", at(4, 18, 0).with_timezone(&Utc)).unwrap();
        assert_eq!(cache.cached_version(&account.id), None);
        assert_eq!(performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap().total_rendered_hours, 0.0);
    }

    #[test]
    fn test_read_from_before_invalidation_is_not_served() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();

        punch(&store, &account, 10, &at(4, 8, 0), false).unwrap();
        let closed = punch(&store, &account, 10, &at(4, 17, 0), false).unwrap();
        assert_eq!(performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap().total_rendered_hours, 9.0);
        let before = store.snapshot("7").unwrap();

        invalidate(&store, &mut cache, closed.record().id, "duplicate entry", at(4, 18, 0).with_timezone(&Utc)).unwrap();
        assert!(matches!(
            cache.stat(&account, &before, &at(4, 18, 0)),
            Err(AttendanceError::StaleData { .. })
        ));

        // A lagging read is refetched instead of served.
        *store.lagging.borrow_mut() = Some(before);
        let stat = performance_for(&store, &mut cache, &account, &at(4, 18, 0)).unwrap();
        assert_eq!(stat.total_rendered_hours, 0.0);
    }

    #[test]
    fn test_read_from_before_delete_is_not_served() {
        let store = MemoryStore::default();
        let account = worker();
        let mut cache = PerformanceCache::new();

        let opened = punch(&store, &account, 10, &at(4, 9, 0), false).unwrap();
        assert!(performance_for(&store, &mut cache, &account, &at(4, 10, 0)).unwrap().is_online);
        let before = store.snapshot("7").unwrap();

        delete(&store, &mut cache, opened.record().id).unwrap();
        assert_eq!(cache.version_floor("7"), Some(store.version("7").unwrap()));
        assert!(cache.stat(&account, &before, &at(4, 10, 0)).is_err());

        *store.lagging.borrow_mut() = Some(before);
        assert!(!performance_for(&store, &mut cache, &account, &at(4, 10, 0)).unwrap().is_online);
    }

    #[test]
    fn test_auto_close_cutoff() {
        let late = at(4, 23, 30);
        assert_eq!(auto_close_cutoff(&late, 23), Some(at(4, 23, 0).with_timezone(&Utc)));

        let morning = at(5, 6, 0);
        assert_eq!(auto_close_cutoff(&morning, 23), Some(at(4, 23, 0).with_timezone(&Utc)));

        assert_eq!(auto_close_cutoff(&morning, 24), None);
    }

    #[test]
    fn test_summarize_skips_invalidated() {
        let base = at(4, 8, 0).with_timezone(&Utc);
        let records = vec![
            ActivityRecord::open(1, "7", "Grace", None, base).closed_at(base + Duration::hours(2)),
            ActivityRecord::open(2, "7", "Grace", None, base + Duration::days(1)),
            ActivityRecord::open(3, "9", "Ada", None, base)
                .closed_at(base + Duration::hours(3))
                .invalidated(base, "duplicate entry"),
            ActivityRecord::open(4, "9", "Ada", None, base + Duration::days(2)).closed_at(base + Duration::days(2) + Duration::hours(1)),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].account_id, "7");
        assert_eq!(summary[0].sessions, 2);
        assert_eq!(summary[0].completed_minutes, 120);
        assert_eq!(summary[1].sessions, 1);
        assert_eq!(summary[1].completed_minutes, 60);
    }

    #[test]
    fn test_summarize_credits_only_measurable_sessions() {
        let base = at(4, 8, 0).with_timezone(&Utc);
        let records = vec![
            ActivityRecord::open(1, "7", "Grace", None, base).closed_at(base + Duration::minutes(45)),
            // Stored data with time-out before time-in has no duration.
            ActivityRecord::open(2, "7", "Grace", None, base).closed_at(base - Duration::minutes(30)),
            ActivityRecord::open(3, "7", "Grace", None, base + Duration::hours(2)),
        ];

        let summary = summarize(&records);
        assert_eq!(summary[0].sessions, 3);
        assert_eq!(summary[0].completed_minutes, 45);
    }
}
