//! Manual time adjustments.
//!
//! An adjustment credits (positive minutes) or deducts (negative minutes)
//! time from a person's total without touching their activity records. Each
//! change bumps the account version so cached performance is refreshed.

use crate::db::db::Db;
use crate::db::versions::bump_version;
use crate::libs::error::{AttendanceError, ValidationError};
use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

const INSERT_ADJUSTMENT: &str = "INSERT INTO time_adjustments (account_id, minutes, reason, created_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_ADJUSTMENTS: &str = "SELECT id, account_id, minutes, reason, created_at FROM time_adjustments";
const SELECT_TOTALS: &str = "SELECT account_id, SUM(minutes) FROM time_adjustments GROUP BY account_id";
const SELECT_TOTALS_BETWEEN: &str = "SELECT account_id, SUM(minutes) FROM time_adjustments
    WHERE created_at >= ?1 AND created_at <= ?2 GROUP BY account_id";
const DELETE_ADJUSTMENT: &str = "DELETE FROM time_adjustments WHERE id = ?1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAdjustment {
    pub id: i64,
    pub account_id: String,
    /// Signed; negative values deduct time
    pub minutes: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

pub struct Adjustments {
    pub conn: Arc<Mutex<Connection>>,
}

fn adjustment_from_row(row: &Row) -> rusqlite::Result<TimeAdjustment> {
    Ok(TimeAdjustment {
        id: row.get(0)?,
        account_id: row.get(1)?,
        minutes: row.get(2)?,
        reason: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Adjustments {
    pub fn new() -> Result<Self> {
        Ok(Self::with_db(Db::new()?))
    }

    pub fn with_db(db: Db) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db.conn)),
        }
    }

    /// Records an adjustment for an existing account. A blank reason is
    /// rejected.
    pub fn insert(&self, account_id: &str, minutes: i64, reason: &str, at: DateTime<Utc>) -> Result<TimeAdjustment> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AttendanceError::from(ValidationError::MissingAdjustmentReason).into());
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)", params![account_id], |row| {
            row.get(0)
        })?;
        if !exists {
            return Err(AttendanceError::account_not_found(account_id).into());
        }

        tx.execute(INSERT_ADJUSTMENT, params![account_id, minutes, reason, at])?;
        let id = tx.last_insert_rowid();
        bump_version(&tx, account_id)?;
        tx.commit()?;

        info!(id, account_id, minutes, "recorded time adjustment");
        Ok(TimeAdjustment {
            id,
            account_id: account_id.to_string(),
            minutes,
            reason: reason.to_string(),
            created_at: at,
        })
    }

    /// Adjustments of one account, oldest first.
    pub fn fetch_for_account(&self, account_id: &str) -> Result<Vec<TimeAdjustment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{} WHERE account_id = ?1 ORDER BY created_at, id", SELECT_ADJUSTMENTS))?;
        let adjustments = stmt
            .query_map(params![account_id], adjustment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(adjustments)
    }

    /// Net adjustment minutes per account id.
    pub fn totals_by_account(&self) -> Result<HashMap<String, i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_TOTALS)?;
        let totals = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(totals)
    }

    /// Net adjustment minutes per account id, counting only adjustments
    /// created within `from..=to`.
    pub fn totals_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<HashMap<String, i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_TOTALS_BETWEEN)?;
        let totals = stmt
            .query_map(params![from, to], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(totals)
    }

    pub fn delete(&self, id: i64) -> Result<TimeAdjustment> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let adjustment = tx
            .query_row(&format!("{} WHERE id = ?1", SELECT_ADJUSTMENTS), params![id], adjustment_from_row)
            .optional()?
            .ok_or(AttendanceError::NotFound {
                entity: "Adjustment",
                id: id.to_string(),
            })?;
        tx.execute(DELETE_ADJUSTMENT, params![id])?;
        bump_version(&tx, &adjustment.account_id)?;
        tx.commit()?;

        info!(id, account_id = %adjustment.account_id, "deleted time adjustment");
        Ok(adjustment)
    }
}
