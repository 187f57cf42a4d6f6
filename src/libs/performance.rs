//! Per-person performance aggregation.
//!
//! Folds a person's activity records into a [`PerformanceStat`]: total
//! rendered hours, average hours per worked day and per worked ISO week, and
//! whether the person is online right now.
//!
//! ## Rules
//!
//! - Invalidated records are skipped entirely.
//! - Only completed records are credited; an open session adds nothing until
//!   it is timed out.
//! - A "day worked" is a local calendar date with at least one completed
//!   record, a "week worked" an ISO week with at least one.
//! - Averages are zero when nothing has been completed.
//! - Manual time adjustments count toward the total but not toward the
//!   averages.
//! - `is_online` is `true` iff some record classifies as
//!   [`ActivityStatus::Active`] at `now`.
//!
//! Aggregation is a pure function of the records, the adjustments and `now`.
//! [`PerformanceCache`] may memoize the closed-interval part per account, but
//! only against the store version the records were read at, and it always
//! recomputes `is_online`.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use clockin::libs::account::Account;
//! use clockin::libs::activity::ActivityRecord;
//! use clockin::libs::performance::aggregate;
//!
//! let account = Account::new("42", "2021-0042", "Ada");
//! let shift = ActivityRecord::open(1, "42", "Ada", None, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
//!     .closed_at(Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());
//!
//! let stat = aggregate(&account, &[shift], 0, &Utc::now());
//! assert_eq!(stat.total_rendered_hours, 9.0);
//! ```

use super::account::Account;
use super::activity::ActivityRecord;
use super::duration::duration_minutes;
use super::error::{AttendanceError, AttendanceResult};
use super::status::{classify, ActivityStatus};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Derived statistics for one person. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceStat {
    pub account_id: String,
    pub school_id: String,
    pub name: String,
    pub job_name: Option<String>,
    pub is_online: bool,
    pub total_rendered_hours: f64,
    pub avg_daily_hours: f64,
    pub avg_weekly_hours: f64,
    pub adjustment_hours: f64,
    pub profile_picture: Option<String>,
}

/// Closed-interval totals of one person's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderedTotals {
    pub completed_minutes: i64,
    pub days_worked: usize,
    pub weeks_worked: usize,
}

impl RenderedTotals {
    /// Folds completed, non-invalidated records; dates are taken in `tz`.
    pub fn from_records<'a, Tz, I>(records: I, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        I: IntoIterator<Item = &'a ActivityRecord>,
    {
        let mut completed_minutes = 0;
        let mut days: HashSet<NaiveDate> = HashSet::new();
        let mut weeks: HashSet<(i32, u32)> = HashSet::new();

        for record in records.into_iter().filter(|r| !r.is_invalidated()) {
            let Some(minutes) = duration_minutes(record) else {
                continue;
            };
            let date = record.time_in.with_timezone(tz).date_naive();
            let week = date.iso_week();

            completed_minutes += minutes;
            days.insert(date);
            weeks.insert((week.year(), week.week()));
        }

        Self {
            completed_minutes,
            days_worked: days.len(),
            weeks_worked: weeks.len(),
        }
    }

    pub fn hours(&self) -> f64 {
        self.completed_minutes as f64 / 60.0
    }

    pub fn avg_daily_hours(&self) -> f64 {
        per_unit(self.hours(), self.days_worked)
    }

    pub fn avg_weekly_hours(&self) -> f64 {
        per_unit(self.hours(), self.weeks_worked)
    }
}

fn per_unit(hours: f64, units: usize) -> f64 {
    if units == 0 {
        0.0
    } else {
        hours / units as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `true` if any of the records is active at `now`.
pub fn is_online<'a, Tz, I>(records: I, now: &DateTime<Tz>) -> bool
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    records
        .into_iter()
        .any(|record| classify(record, now) == ActivityStatus::Active)
}

fn build_stat(account: &Account, totals: RenderedTotals, adjustment_minutes: i64, online: bool) -> PerformanceStat {
    let adjustment_hours = adjustment_minutes as f64 / 60.0;

    PerformanceStat {
        account_id: account.id.clone(),
        school_id: account.school_id.clone(),
        name: account.name.clone(),
        job_name: account.job.as_ref().map(|job| job.name.clone()),
        is_online: online,
        total_rendered_hours: round2(totals.hours() + adjustment_hours),
        avg_daily_hours: round2(totals.avg_daily_hours()),
        avg_weekly_hours: round2(totals.avg_weekly_hours()),
        adjustment_hours: round2(adjustment_hours),
        profile_picture: account.profile_picture.clone(),
    }
}

/// Aggregates one person's records as of `now`.
///
/// Records that belong to another account are ignored, so the full record
/// set may be passed in.
pub fn aggregate<Tz: TimeZone>(
    account: &Account,
    records: &[ActivityRecord],
    adjustment_minutes: i64,
    now: &DateTime<Tz>,
) -> PerformanceStat {
    let own = || records.iter().filter(|r| r.account_id == account.id);
    let totals = RenderedTotals::from_records(own(), &now.timezone());
    build_stat(account, totals, adjustment_minutes, is_online(own(), now))
}

/// Which people to keep by online state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OnlineFilter {
    #[default]
    All,
    Online,
    Offline,
}

impl OnlineFilter {
    fn keeps(&self, online: bool) -> bool {
        match self {
            OnlineFilter::All => true,
            OnlineFilter::Online => online,
            OnlineFilter::Offline => !online,
        }
    }
}

impl fmt::Display for OnlineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OnlineFilter::All => "all",
            OnlineFilter::Online => "online",
            OnlineFilter::Offline => "offline",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceFilter {
    pub status: OnlineFilter,
    /// Case-insensitive match on name or school id
    pub search: Option<String>,
    pub job_id: Option<i64>,
}

impl PerformanceFilter {
    fn keeps_account(&self, account: &Account) -> bool {
        let search_ok = self.search.as_deref().map_or(true, |needle| account.matches(needle));
        let job_ok = self
            .job_id
            .map_or(true, |job_id| account.job.as_ref().map(|job| job.id) == Some(job_id));
        search_ok && job_ok
    }
}

/// Aggregates every account in `accounts`.
///
/// Results are sorted by total rendered hours, highest first, then by name.
pub fn aggregate_all<Tz: TimeZone>(
    accounts: &[Account],
    records: &[ActivityRecord],
    adjustments: &HashMap<String, i64>,
    now: &DateTime<Tz>,
    filter: &PerformanceFilter,
) -> Vec<PerformanceStat> {
    let mut by_account: HashMap<&str, Vec<&ActivityRecord>> = HashMap::new();
    for record in records {
        by_account.entry(record.account_id.as_str()).or_default().push(record);
    }

    let tz = now.timezone();
    let mut stats: Vec<PerformanceStat> = accounts
        .iter()
        .filter(|account| filter.keeps_account(account))
        .map(|account| {
            let own = by_account.get(account.id.as_str()).map(Vec::as_slice).unwrap_or_default();
            let totals = RenderedTotals::from_records(own.iter().copied(), &tz);
            let online = is_online(own.iter().copied(), now);
            let adjustment = adjustments.get(&account.id).copied().unwrap_or(0);
            build_stat(account, totals, adjustment, online)
        })
        .filter(|stat| filter.status.keeps(stat.is_online))
        .collect();

    stats.sort_by(|a, b| {
        b.total_rendered_hours
            .total_cmp(&a.total_rendered_hours)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats
}

/// Leaderboard size used when none is requested.
pub const LEADERBOARD_DEFAULT_LIMIT: usize = 50;

/// Largest leaderboard that is ever returned.
pub const LEADERBOARD_MAX_LIMIT: usize = 100;

/// Size used for a requested limit of zero.
const LEADERBOARD_FALLBACK_LIMIT: usize = 10;

/// Clamps a requested leaderboard size to `1..=100`; zero falls back to 10.
pub fn leaderboard_limit(requested: usize) -> usize {
    match requested {
        0 => LEADERBOARD_FALLBACK_LIMIT,
        n => n.min(LEADERBOARD_MAX_LIMIT),
    }
}

/// Inclusive range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.from && *instant <= self.to
    }
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub account_id: String,
    pub school_id: String,
    pub name: String,
    pub job_id: Option<i64>,
    pub job_name: Option<String>,
    /// Completed minutes plus adjustments
    pub total_minutes: i64,
    /// Completed, non-invalidated sessions counted in the total
    pub completed_count: usize,
    pub is_online: bool,
    pub profile_picture: Option<String>,
}

/// Ranks accounts by completed minutes plus adjustments, highest first.
///
/// With a `window`, only records whose time-in falls inside it count;
/// `adjustments` must already be restricted to the same window by the
/// caller. Accounts whose total is not positive are left out, ties are
/// broken by name, and at most [`leaderboard_limit`]`(limit)` entries are
/// returned. `is_online` looks at every record, whatever the window.
pub fn leaderboard<Tz: TimeZone>(
    accounts: &[Account],
    records: &[ActivityRecord],
    adjustments: &HashMap<String, i64>,
    window: Option<&TimeWindow>,
    limit: usize,
    now: &DateTime<Tz>,
) -> Vec<LeaderboardEntry> {
    let mut by_account: HashMap<&str, Vec<&ActivityRecord>> = HashMap::new();
    for record in records {
        by_account.entry(record.account_id.as_str()).or_default().push(record);
    }

    let mut entries: Vec<LeaderboardEntry> = accounts
        .iter()
        .filter_map(|account| {
            let own = by_account.get(account.id.as_str()).map(Vec::as_slice).unwrap_or_default();
            let completed: Vec<i64> = own
                .iter()
                .filter(|r| !r.is_invalidated())
                .filter(|r| window.map_or(true, |w| w.contains(&r.time_in)))
                .filter_map(|r| duration_minutes(r))
                .collect();
            let total_minutes = completed.iter().sum::<i64>() + adjustments.get(&account.id).copied().unwrap_or(0);
            if total_minutes <= 0 {
                return None;
            }

            Some(LeaderboardEntry {
                rank: 0,
                account_id: account.id.clone(),
                school_id: account.school_id.clone(),
                name: account.name.clone(),
                job_id: account.job.as_ref().map(|job| job.id),
                job_name: account.job.as_ref().map(|job| job.name.clone()),
                total_minutes,
                completed_count: completed.len(),
                is_online: is_online(own.iter().copied(), now),
                profile_picture: account.profile_picture.clone(),
            })
        })
        .collect();

    entries.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(leaderboard_limit(limit));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

/// Records and adjustments of one account, read at a single store version.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub version: u64,
    pub records: Vec<ActivityRecord>,
    pub adjustment_minutes: i64,
}

#[derive(Debug, Clone, Copy)]
struct CachedTotals {
    /// Lowest version a snapshot may have to be accepted
    version: u64,
    /// `None` after an invalidation: the floor is kept, the totals are not
    totals: Option<(FixedOffset, RenderedTotals)>,
}

/// Memo of closed-interval totals keyed by account and store version.
///
/// A snapshot at the cached version reuses the totals; a newer snapshot
/// replaces them; an older one is refused with
/// [`AttendanceError::StaleData`]. Invalidating an account drops its totals
/// but keeps the version floor, so a read that started before the mutation
/// is still refused.
#[derive(Debug, Default)]
pub struct PerformanceCache {
    entries: HashMap<String, CachedTotals>,
}

impl PerformanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stat<Tz: TimeZone>(
        &mut self,
        account: &Account,
        snapshot: &AccountSnapshot,
        now: &DateTime<Tz>,
    ) -> AttendanceResult<PerformanceStat> {
        let offset = now.offset().fix();

        let totals = match self.entries.get(&account.id) {
            Some(cached) if cached.version > snapshot.version => {
                return Err(AttendanceError::StaleData {
                    account_id: account.id.clone(),
                    seen: snapshot.version,
                    current: cached.version,
                });
            }
            Some(CachedTotals {
                version,
                totals: Some((cached_offset, totals)),
            }) if *version == snapshot.version && *cached_offset == offset => *totals,
            _ => {
                let totals = RenderedTotals::from_records(&snapshot.records, &now.timezone());
                self.entries.insert(
                    account.id.clone(),
                    CachedTotals {
                        version: snapshot.version,
                        totals: Some((offset, totals)),
                    },
                );
                totals
            }
        };

        let online = is_online(&snapshot.records, now);
        Ok(build_stat(account, totals, snapshot.adjustment_minutes, online))
    }

    /// Drops the cached totals of `account_id` and refuses snapshots older
    /// than `at_least` from now on.
    pub fn invalidate(&mut self, account_id: &str, at_least: u64) {
        let floor = self
            .entries
            .get(account_id)
            .map_or(at_least, |cached| cached.version.max(at_least));
        self.entries.insert(
            account_id.to_string(),
            CachedTotals {
                version: floor,
                totals: None,
            },
        );
    }

    /// Version the cached totals were computed at, if any are held.
    pub fn cached_version(&self, account_id: &str) -> Option<u64> {
        self.entries
            .get(account_id)
            .filter(|cached| cached.totals.is_some())
            .map(|cached| cached.version)
    }

    /// Oldest snapshot version still accepted for `account_id`.
    pub fn version_floor(&self, account_id: &str) -> Option<u64> {
        self.entries.get(account_id).map(|cached| cached.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::activity::JobReference;
    use chrono::Utc;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn shift(id: i64, account: &str, day: u32, from: u32, to: u32) -> ActivityRecord {
        ActivityRecord::open(id, account, "", None, local(2024, 1, day, from).with_timezone(&Utc))
            .closed_at(local(2024, 1, day, to).with_timezone(&Utc))
    }

    fn ada() -> Account {
        Account::new("42", "2021-0042", "Ada").with_job(JobReference::new(1, "Library"))
    }

    #[test]
    fn test_empty_record_set_is_all_zero_and_offline() {
        let stat = aggregate(&ada(), &[], 0, &local(2024, 1, 1, 9));

        assert_eq!(stat.total_rendered_hours, 0.0);
        assert_eq!(stat.avg_daily_hours, 0.0);
        assert_eq!(stat.avg_weekly_hours, 0.0);
        assert!(!stat.is_online);
        assert_eq!(stat.job_name.as_deref(), Some("Library"));
    }

    #[test]
    fn test_averages_per_day_and_iso_week() {
        // 2024-01-01 and 01-02 share ISO week 1; 01-08 is week 2.
        let records = vec![
            shift(1, "42", 1, 8, 12),
            shift(2, "42", 1, 13, 17),
            shift(3, "42", 2, 8, 14),
            shift(4, "42", 8, 8, 10),
        ];
        let stat = aggregate(&ada(), &records, 0, &local(2024, 1, 9, 9));

        assert_eq!(stat.total_rendered_hours, 16.0);
        assert_eq!(stat.avg_daily_hours, 5.33);
        assert_eq!(stat.avg_weekly_hours, 8.0);
    }

    #[test]
    fn test_open_and_invalidated_records_are_not_credited() {
        let now = local(2024, 1, 3, 10);
        let records = vec![
            shift(1, "42", 2, 8, 17),
            shift(2, "42", 1, 8, 17).invalidated(Utc::now(), "duplicate entry"),
            ActivityRecord::open(3, "42", "", None, local(2024, 1, 3, 9).with_timezone(&Utc)),
        ];
        let stat = aggregate(&ada(), &records, 0, &now);

        assert_eq!(stat.total_rendered_hours, 9.0);
        assert_eq!(stat.avg_daily_hours, 9.0);
        assert!(stat.is_online);
    }

    #[test]
    fn test_overdue_session_is_not_online() {
        let records = vec![ActivityRecord::open(1, "42", "", None, local(2024, 1, 2, 9).with_timezone(&Utc))];
        assert!(!aggregate(&ada(), &records, 0, &local(2024, 1, 3, 10)).is_online);
    }

    #[test]
    fn test_adjustments_change_total_not_averages() {
        let records = vec![shift(1, "42", 1, 8, 17)];
        let stat = aggregate(&ada(), &records, 90, &local(2024, 1, 2, 9));

        assert_eq!(stat.total_rendered_hours, 10.5);
        assert_eq!(stat.adjustment_hours, 1.5);
        assert_eq!(stat.avg_daily_hours, 9.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = vec![shift(1, "42", 1, 8, 17), shift(2, "42", 2, 8, 11)];
        let now = local(2024, 1, 2, 12);

        assert_eq!(aggregate(&ada(), &records, 15, &now), aggregate(&ada(), &records, 15, &now));
    }

    #[test]
    fn test_aggregate_all_sorts_and_filters() {
        let accounts = vec![
            ada(),
            Account::new("7", "2021-0007", "Grace"),
            Account::new("9", "2021-0009", "Barbara"),
        ];
        let now = local(2024, 1, 2, 10);
        let records = vec![
            shift(1, "42", 1, 8, 12),
            shift(2, "7", 1, 8, 17),
            ActivityRecord::open(3, "9", "", None, local(2024, 1, 2, 9).with_timezone(&Utc)),
        ];
        let adjustments = HashMap::new();

        let all = aggregate_all(&accounts, &records, &adjustments, &now, &PerformanceFilter::default());
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Grace", "Ada", "Barbara"]);

        let online_only = PerformanceFilter {
            status: OnlineFilter::Online,
            ..Default::default()
        };
        let online = aggregate_all(&accounts, &records, &adjustments, &now, &online_only);
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].name, "Barbara");

        let search = PerformanceFilter {
            search: Some("0007".to_string()),
            ..Default::default()
        };
        assert_eq!(aggregate_all(&accounts, &records, &adjustments, &now, &search)[0].name, "Grace");

        let by_job = PerformanceFilter {
            job_id: Some(1),
            ..Default::default()
        };
        assert_eq!(aggregate_all(&accounts, &records, &adjustments, &now, &by_job)[0].name, "Ada");
    }

    fn roster() -> Vec<Account> {
        vec![
            ada(),
            Account::new("7", "2021-0007", "Grace"),
            Account::new("9", "2021-0009", "Barbara"),
            Account::new("11", "2021-0011", "Linus"),
        ]
    }

    #[test]
    fn test_leaderboard_ranks_by_total_with_adjustments() {
        let records = vec![
            shift(1, "42", 1, 8, 12),
            shift(2, "42", 2, 8, 10),
            shift(3, "7", 1, 8, 17),
            shift(4, "9", 1, 8, 12),
        ];
        let adjustments = HashMap::from([("9".to_string(), 120)]);

        let board = leaderboard(&roster(), &records, &adjustments, None, 10, &local(2024, 1, 3, 9));
        let ranked: Vec<(usize, &str, i64)> = board
            .iter()
            .map(|e| (e.rank, e.name.as_str(), e.total_minutes))
            .collect();
        // Ada and Barbara tie at six hours; names break the tie.
        assert_eq!(ranked, vec![(1, "Grace", 540), (2, "Ada", 360), (3, "Barbara", 360)]);
        assert_eq!(board[1].completed_count, 2);
        assert_eq!(board[1].job_id, Some(1));
        assert_eq!(board[2].completed_count, 1);
    }

    #[test]
    fn test_leaderboard_hides_accounts_without_positive_total() {
        let records = vec![
            shift(1, "42", 1, 8, 9),
            shift(2, "7", 1, 8, 17).invalidated(Utc::now(), "duplicate entry"),
            ActivityRecord::open(3, "9", "", None, local(2024, 1, 3, 8).with_timezone(&Utc)),
        ];
        let adjustments = HashMap::from([("42".to_string(), -60)]);

        let board = leaderboard(&roster(), &records, &adjustments, None, 10, &local(2024, 1, 3, 9));
        assert!(board.is_empty());
    }

    #[test]
    fn test_leaderboard_window_limits_records_not_online() {
        let records = vec![
            shift(1, "42", 1, 8, 17),
            shift(2, "42", 8, 8, 10),
            shift(3, "7", 2, 8, 11),
            ActivityRecord::open(4, "7", "", None, local(2024, 1, 9, 8).with_timezone(&Utc)),
        ];
        let window = TimeWindow {
            from: local(2024, 1, 8, 0).with_timezone(&Utc),
            to: local(2024, 1, 9, 0).with_timezone(&Utc),
        };
        assert!(window.contains(&local(2024, 1, 8, 8).with_timezone(&Utc)));
        assert!(!window.contains(&local(2024, 1, 2, 8).with_timezone(&Utc)));

        let board = leaderboard(&roster(), &records, &HashMap::new(), Some(&window), 10, &local(2024, 1, 9, 9));
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "Ada");
        assert_eq!(board[0].total_minutes, 120);
        assert_eq!(board[0].completed_count, 1);
        assert!(!board[0].is_online);

        let everything = leaderboard(&roster(), &records, &HashMap::new(), None, 10, &local(2024, 1, 9, 9));
        let grace = everything.iter().find(|e| e.name == "Grace").unwrap();
        assert!(grace.is_online);
        assert_eq!(grace.total_minutes, 180);
    }

    #[test]
    fn test_leaderboard_limit_is_capped() {
        assert_eq!(leaderboard_limit(5), 5);
        assert_eq!(leaderboard_limit(0), 10);
        assert_eq!(leaderboard_limit(500), LEADERBOARD_MAX_LIMIT);

        let accounts: Vec<Account> = (0..120)
            .map(|i| Account::new(&i.to_string(), &format!("2024-{:04}", i), &format!("Student {:03}", i)))
            .collect();
        let records: Vec<ActivityRecord> = (0..120)
            .map(|i| shift(i, &i.to_string(), 1, 8, 9 + (i % 8) as u32))
            .collect();

        let board = leaderboard(&accounts, &records, &HashMap::new(), None, 500, &local(2024, 1, 2, 9));
        assert_eq!(board.len(), 100);
        assert_eq!(board.last().unwrap().rank, 100);
        assert!(board.windows(2).all(|pair| pair[0].total_minutes >= pair[1].total_minutes));

        let top = leaderboard(&accounts, &records, &HashMap::new(), None, 3, &local(2024, 1, 2, 9));
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].total_minutes, 480);
    }

    #[test]
    fn test_cache_reuses_same_version_and_refuses_older() {
        let account = ada();
        let now = local(2024, 1, 2, 10);
        let mut cache = PerformanceCache::new();

        let v1 = AccountSnapshot {
            account_id: "42".to_string(),
            version: 1,
            records: vec![shift(1, "42", 1, 8, 17)],
            adjustment_minutes: 0,
        };
        assert_eq!(cache.stat(&account, &v1, &now).unwrap().total_rendered_hours, 9.0);
        assert_eq!(cache.cached_version("42"), Some(1));

        let v2 = AccountSnapshot {
            version: 2,
            records: vec![],
            ..v1.clone()
        };
        assert_eq!(cache.stat(&account, &v2, &now).unwrap().total_rendered_hours, 0.0);

        let err = cache.stat(&account, &v1, &now).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::StaleData {
                account_id: "42".to_string(),
                seen: 1,
                current: 2
            }
        );

        cache.invalidate("42", 3);
        assert_eq!(cache.cached_version("42"), None);
        assert_eq!(cache.version_floor("42"), Some(3));
    }

    #[test]
    fn test_invalidated_cache_refuses_reads_from_before_the_mutation() {
        let account = ada();
        let now = local(2024, 1, 2, 10);
        let mut cache = PerformanceCache::new();

        let before = AccountSnapshot {
            account_id: "42".to_string(),
            version: 2,
            records: vec![shift(1, "42", 1, 8, 17)],
            adjustment_minutes: 0,
        };
        assert_eq!(cache.stat(&account, &before, &now).unwrap().total_rendered_hours, 9.0);

        // The record was invalidated; the store moved to version 3.
        cache.invalidate("42", 3);
        assert_eq!(
            cache.stat(&account, &before, &now).unwrap_err(),
            AttendanceError::StaleData {
                account_id: "42".to_string(),
                seen: 2,
                current: 3
            }
        );

        let after = AccountSnapshot {
            version: 3,
            records: vec![shift(1, "42", 1, 8, 17).invalidated(Utc::now(), "duplicate entry")],
            ..before.clone()
        };
        assert_eq!(cache.stat(&account, &after, &now).unwrap().total_rendered_hours, 0.0);
        assert_eq!(cache.cached_version("42"), Some(3));

        // A floor below what was already seen never lowers it.
        cache.invalidate("42", 1);
        assert_eq!(cache.version_floor("42"), Some(3));
    }

    #[test]
    fn test_cache_recomputes_online_every_call() {
        let account = ada();
        let mut cache = PerformanceCache::new();
        let snapshot = AccountSnapshot {
            account_id: "42".to_string(),
            version: 3,
            records: vec![ActivityRecord::open(1, "42", "", None, local(2024, 1, 2, 9).with_timezone(&Utc))],
            adjustment_minutes: 0,
        };

        assert!(cache.stat(&account, &snapshot, &local(2024, 1, 2, 10)).unwrap().is_online);
        assert!(!cache.stat(&account, &snapshot, &local(2024, 1, 3, 10)).unwrap().is_online);
    }
}
