//! Database operations for activity records.
//!
//! [`Activities`] is the SQLite implementation of
//! [`RecordStore`](crate::libs::store::RecordStore). Each mutation runs in an
//! `IMMEDIATE` transaction, so the checks it makes (record exists, account
//! has no open session, time-out not applied yet) hold when the write lands.
//! Each mutation also bumps the owning account's version in the same
//! transaction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use clockin::db::activities::Activities;
//! use clockin::libs::store::RecordStore;
//!
//! let activities = Activities::new()?;
//! let record = activities.open_record("42", None, Utc::now())?;
//! activities.close_record(record.id, Utc::now())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::db::db::Db;
use crate::db::versions::{bump_version, current_version};
use crate::libs::activity::{ActivityRecord, JobReference};
use crate::libs::error::{AttendanceError, ValidationError};
use crate::libs::performance::AccountSnapshot;
use crate::libs::store::RecordStore;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use std::sync::Arc;
use tracing::{debug, info};

const SELECT_ACTIVITY: &str = "SELECT a.id, a.account_id, COALESCE(acc.name, ''), a.job_id, a.job_name,
        a.time_in, a.time_out, a.invalidated_at, a.invalidation_notes, a.auto_closed, a.created_at
    FROM activities a
    LEFT JOIN accounts acc ON acc.id = a.account_id";

const INSERT_ACTIVITY: &str = "INSERT INTO activities (account_id, job_id, job_name, time_in, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_TIME_OUT: &str = "UPDATE activities SET time_out = ?1 WHERE id = ?2 AND time_out IS NULL";
const UPDATE_INVALIDATE: &str =
    "UPDATE activities SET invalidated_at = ?1, invalidation_notes = ?2, time_out = ?3 WHERE id = ?4";
const UPDATE_CLOSE_INVALIDATED: &str = "UPDATE activities SET time_out = ?1, invalidated_at = ?1, invalidation_notes = ?2
    WHERE id = ?3 AND time_out IS NULL AND invalidated_at IS NULL";
const UPDATE_AUTO_CLOSE: &str = "UPDATE activities SET time_out = ?1, auto_closed = TRUE WHERE id = ?2 AND time_out IS NULL";
const DELETE_ACTIVITY: &str = "DELETE FROM activities WHERE id = ?1";
const SELECT_OPEN_ID: &str = "SELECT id FROM activities
    WHERE account_id = ?1 AND time_out IS NULL AND invalidated_at IS NULL
    ORDER BY time_in DESC LIMIT 1";
const SELECT_ACCOUNT_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)";
const SELECT_ADJUSTMENT_SUM: &str = "SELECT COALESCE(SUM(minutes), 0) FROM time_adjustments WHERE account_id = ?1";

/// Minutes added to time-in when an open record is invalidated.
pub const DEFAULT_INVALIDATION_FILL_MINUTES: i64 = 30;

/// Selection criteria for listing activities.
///
/// A date range matches on time-in. Open records are always listed
/// regardless of the range so that forgotten sessions stay visible.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub account_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// SQLite-backed activity record store.
pub struct Activities {
    pub conn: Arc<Mutex<Connection>>,
    invalidation_fill: Duration,
}

fn activity_from_row(row: &Row) -> rusqlite::Result<ActivityRecord> {
    let job_id: Option<i64> = row.get(3)?;
    let job_name: Option<String> = row.get(4)?;

    Ok(ActivityRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        account_name: row.get(2)?,
        job: job_id.map(|id| JobReference {
            id,
            name: job_name.unwrap_or_default(),
        }),
        time_in: row.get(5)?,
        time_out: row.get(6)?,
        invalidated_at: row.get(7)?,
        invalidation_notes: row.get(8)?,
        auto_closed: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn fetch_on(conn: &Connection, id: i64) -> Result<Option<ActivityRecord>> {
    let sql = format!("{} WHERE a.id = ?1", SELECT_ACTIVITY);
    let record = conn.query_row(&sql, params![id], activity_from_row).optional()?;
    Ok(record)
}

fn require_on(conn: &Connection, id: i64) -> Result<ActivityRecord> {
    fetch_on(conn, id)?.ok_or_else(|| AttendanceError::activity_not_found(id).into())
}

fn query_records(conn: &Connection, sql: &str, values: &[&dyn ToSql]) -> Result<Vec<ActivityRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let records = stmt
        .query_map(params_from_iter(values.iter()), activity_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn require_reason(reason: &str) -> Result<&str> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AttendanceError::from(ValidationError::MissingReason).into());
    }
    Ok(reason)
}

impl Activities {
    /// Opens the store on the default database.
    pub fn new() -> Result<Self> {
        Ok(Self::with_db(Db::new()?))
    }

    pub fn with_db(db: Db) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db.conn)),
            invalidation_fill: Duration::minutes(DEFAULT_INVALIDATION_FILL_MINUTES),
        }
    }

    /// Sets how far after time-in an invalidated open record is closed.
    /// Values below one minute are raised to one so time-out stays after
    /// time-in.
    pub fn with_invalidation_fill(mut self, minutes: i64) -> Self {
        self.invalidation_fill = Duration::minutes(minutes.max(1));
        self
    }

    /// Lists records matching `filter`, open ones first, then newest first.
    pub fn fetch(&self, filter: &ActivityFilter) -> Result<Vec<ActivityRecord>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(account_id) = &filter.account_id {
            values.push(account_id);
            conditions.push(format!("a.account_id = ?{}", values.len()));
        }

        let mut range: Vec<String> = Vec::new();
        if let Some(from) = &filter.from {
            values.push(from);
            range.push(format!("a.time_in >= ?{}", values.len()));
        }
        if let Some(to) = &filter.to {
            values.push(to);
            range.push(format!("a.time_in <= ?{}", values.len()));
        }
        if !range.is_empty() {
            conditions.push(format!("(({}) OR a.time_out IS NULL)", range.join(" AND ")));
        }

        let where_clause = if conditions.is_empty() {
            String::from("1=1")
        } else {
            conditions.join(" AND ")
        };
        let sql = format!(
            "{} WHERE {} ORDER BY (a.time_out IS NULL) DESC, a.time_in DESC",
            SELECT_ACTIVITY, where_clause
        );

        let conn = self.conn.lock();
        query_records(&conn, &sql, &values)
    }

    /// Every record in the store.
    pub fn fetch_all(&self) -> Result<Vec<ActivityRecord>> {
        self.fetch(&ActivityFilter::default())
    }

    /// Open, non-invalidated records of all accounts.
    pub fn fetch_open(&self) -> Result<Vec<ActivityRecord>> {
        let sql = format!(
            "{} WHERE a.time_out IS NULL AND a.invalidated_at IS NULL ORDER BY a.time_in DESC",
            SELECT_ACTIVITY
        );
        let conn = self.conn.lock();
        query_records(&conn, &sql, &[])
    }

    /// Closes every open record in `ids` at `time_out`; closed and
    /// invalidated records are left alone. Returns how many were closed.
    ///
    /// All ids must exist; nothing is written otherwise.
    pub fn bulk_close(&self, ids: &[i64], time_out: DateTime<Utc>) -> Result<usize> {
        if ids.is_empty() {
            return Err(AttendanceError::from(ValidationError::EmptySelection).into());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut closed = 0;

        for &id in ids {
            let record = require_on(&tx, id)?;
            if !record.is_live() {
                continue;
            }
            if time_out <= record.time_in {
                return Err(AttendanceError::from(ValidationError::TimeOutNotAfterTimeIn).into());
            }
            tx.execute(UPDATE_TIME_OUT, params![time_out, id])?;
            bump_version(&tx, &record.account_id)?;
            closed += 1;
        }

        tx.commit()?;
        info!(count = closed, "bulk closed activities");
        Ok(closed)
    }

    /// Invalidates every record in `ids` not already invalidated.
    pub fn bulk_invalidate(&self, ids: &[i64], reason: &str, at: DateTime<Utc>) -> Result<usize> {
        let reason = require_reason(reason)?;
        if ids.is_empty() {
            return Err(AttendanceError::from(ValidationError::EmptySelection).into());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut invalidated = 0;

        for &id in ids {
            let record = require_on(&tx, id)?;
            if record.is_invalidated() {
                continue;
            }
            let time_out = record.time_out.unwrap_or(record.time_in + self.invalidation_fill);
            tx.execute(UPDATE_INVALIDATE, params![at, reason, time_out, id])?;
            bump_version(&tx, &record.account_id)?;
            invalidated += 1;
        }

        tx.commit()?;
        info!(count = invalidated, "bulk invalidated activities");
        Ok(invalidated)
    }

    /// Deletes every record in `ids`. All ids must exist.
    pub fn bulk_delete(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Err(AttendanceError::from(ValidationError::EmptySelection).into());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for &id in ids {
            let record = require_on(&tx, id)?;
            tx.execute(DELETE_ACTIVITY, params![id])?;
            bump_version(&tx, &record.account_id)?;
        }

        tx.commit()?;
        info!(count = ids.len(), "bulk deleted activities");
        Ok(ids.len())
    }

    /// Closes every live session opened before `cutoff`, at `cutoff`, and
    /// flags it as auto-closed. Returns the closed records.
    pub fn auto_close(&self, cutoff: DateTime<Utc>) -> Result<Vec<ActivityRecord>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let sql = format!(
            "{} WHERE a.time_out IS NULL AND a.invalidated_at IS NULL AND a.time_in < ?1",
            SELECT_ACTIVITY
        );
        let pending = query_records(&tx, &sql, &[&cutoff])?;

        let mut closed = Vec::with_capacity(pending.len());
        for record in pending {
            tx.execute(UPDATE_AUTO_CLOSE, params![cutoff, record.id])?;
            bump_version(&tx, &record.account_id)?;
            closed.push(ActivityRecord {
                time_out: Some(cutoff),
                auto_closed: true,
                ..record
            });
        }

        tx.commit()?;
        info!(count = closed.len(), %cutoff, "auto-closed open activities");
        Ok(closed)
    }
}

impl RecordStore for Activities {
    fn open_record(&self, account_id: &str, job: Option<&JobReference>, time_in: DateTime<Utc>) -> Result<ActivityRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(SELECT_ACCOUNT_EXISTS, params![account_id], |row| row.get(0))?;
        if !exists {
            return Err(AttendanceError::account_not_found(account_id).into());
        }

        let open_id: Option<i64> = tx.query_row(SELECT_OPEN_ID, params![account_id], |row| row.get(0)).optional()?;
        if let Some(open_id) = open_id {
            return Err(AttendanceError::from(ValidationError::AlreadyOpen {
                account_id: account_id.to_string(),
                open_id,
            })
            .into());
        }

        tx.execute(
            INSERT_ACTIVITY,
            params![account_id, job.map(|j| j.id), job.map(|j| j.name.as_str()), time_in, Utc::now()],
        )?;
        let id = tx.last_insert_rowid();
        let version = bump_version(&tx, account_id)?;
        let record = require_on(&tx, id)?;
        tx.commit()?;

        debug!(id, account_id, version, "opened activity");
        Ok(record)
    }

    fn close_record(&self, id: i64, time_out: DateTime<Utc>) -> Result<ActivityRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = require_on(&tx, id)?;
        if record.is_invalidated() {
            return Err(AttendanceError::from(ValidationError::AlreadyInvalidated(id)).into());
        }
        if record.time_out.is_some() {
            return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
        }
        if time_out <= record.time_in {
            return Err(AttendanceError::from(ValidationError::TimeOutNotAfterTimeIn).into());
        }

        if tx.execute(UPDATE_TIME_OUT, params![time_out, id])? == 0 {
            return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
        }
        let version = bump_version(&tx, &record.account_id)?;
        tx.commit()?;

        debug!(id, account_id = %record.account_id, version, "closed activity");
        Ok(record.closed_at(time_out))
    }

    fn invalidate_record(&self, id: i64, reason: &str, at: DateTime<Utc>) -> Result<ActivityRecord> {
        let reason = require_reason(reason)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = require_on(&tx, id)?;
        if record.is_invalidated() {
            return Err(AttendanceError::from(ValidationError::AlreadyInvalidated(id)).into());
        }

        let time_out = record.time_out.unwrap_or(record.time_in + self.invalidation_fill);
        tx.execute(UPDATE_INVALIDATE, params![at, reason, time_out, id])?;
        let version = bump_version(&tx, &record.account_id)?;
        tx.commit()?;

        info!(id, account_id = %record.account_id, version, reason, "invalidated activity");
        Ok(record.closed_at(time_out).invalidated(at, reason))
    }

    fn close_invalidated(&self, id: i64, time_out: DateTime<Utc>, reason: &str) -> Result<ActivityRecord> {
        let reason = require_reason(reason)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = require_on(&tx, id)?;
        if record.is_invalidated() {
            return Err(AttendanceError::from(ValidationError::AlreadyInvalidated(id)).into());
        }
        if record.time_out.is_some() {
            return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
        }
        if time_out <= record.time_in {
            return Err(AttendanceError::from(ValidationError::TimeOutNotAfterTimeIn).into());
        }

        if tx.execute(UPDATE_CLOSE_INVALIDATED, params![time_out, reason, id])? == 0 {
            return Err(AttendanceError::from(ValidationError::AlreadyClosed(id)).into());
        }
        let version = bump_version(&tx, &record.account_id)?;
        tx.commit()?;

        info!(id, account_id = %record.account_id, version, reason, "closed and invalidated activity");
        Ok(record.closed_at(time_out).invalidated(time_out, reason))
    }

    fn delete_record(&self, id: i64) -> Result<ActivityRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = require_on(&tx, id)?;
        tx.execute(DELETE_ACTIVITY, params![id])?;
        let version = bump_version(&tx, &record.account_id)?;
        tx.commit()?;

        info!(id, account_id = %record.account_id, version, "deleted activity");
        Ok(record)
    }

    fn record(&self, id: i64) -> Result<Option<ActivityRecord>> {
        let conn = self.conn.lock();
        fetch_on(&conn, id)
    }

    fn open_record_for(&self, account_id: &str) -> Result<Option<ActivityRecord>> {
        let conn = self.conn.lock();
        let open_id: Option<i64> = conn.query_row(SELECT_OPEN_ID, params![account_id], |row| row.get(0)).optional()?;
        match open_id {
            Some(id) => fetch_on(&conn, id),
            None => Ok(None),
        }
    }

    fn snapshot(&self, account_id: &str) -> Result<AccountSnapshot> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let version = current_version(&tx, account_id)?;
        let sql = format!("{} WHERE a.account_id = ?1 ORDER BY a.time_in", SELECT_ACTIVITY);
        let records = query_records(&tx, &sql, &[&account_id])?;
        let adjustment_minutes: i64 = tx.query_row(SELECT_ADJUSTMENT_SUM, params![account_id], |row| row.get(0))?;
        tx.commit()?;

        Ok(AccountSnapshot {
            account_id: account_id.to_string(),
            version,
            records,
            adjustment_minutes,
        })
    }

    fn version(&self, account_id: &str) -> Result<u64> {
        let conn = self.conn.lock();
        current_version(&conn, account_id)
    }
}
