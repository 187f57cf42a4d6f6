//! Roster of people who can clock in.

use crate::db::db::Db;
use crate::libs::account::Account;
use crate::libs::activity::JobReference;
use crate::libs::error::AttendanceError;
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tracing::debug;

const INSERT_ACCOUNT: &str = "INSERT INTO accounts (id, school_id, name, job_id, job_name, profile_picture)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_ACCOUNTS: &str = "SELECT id, school_id, name, job_id, job_name, profile_picture FROM accounts";
const UPDATE_JOB: &str = "UPDATE accounts SET job_id = ?1, job_name = ?2 WHERE id = ?3";

pub struct Accounts {
    pub conn: Arc<Mutex<Connection>>,
}

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    let job_id: Option<i64> = row.get(3)?;
    let job_name: Option<String> = row.get(4)?;

    Ok(Account {
        id: row.get(0)?,
        school_id: row.get(1)?,
        name: row.get(2)?,
        job: job_id.map(|id| JobReference {
            id,
            name: job_name.unwrap_or_default(),
        }),
        profile_picture: row.get(5)?,
    })
}

impl Accounts {
    pub fn new() -> Result<Self> {
        Ok(Self::with_db(Db::new()?))
    }

    pub fn with_db(db: Db) -> Self {
        Self {
            conn: Arc::new(Mutex::new(db.conn)),
        }
    }

    pub fn insert(&self, account: &Account) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            INSERT_ACCOUNT,
            params![
                account.id,
                account.school_id,
                account.name,
                account.job.as_ref().map(|j| j.id),
                account.job.as_ref().map(|j| j.name.as_str()),
                account.profile_picture,
            ],
        )?;
        debug!(id = %account.id, school_id = %account.school_id, "inserted account");
        Ok(())
    }

    pub fn fetch(&self, id: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_ACCOUNTS), params![id], account_from_row)
            .optional()?;
        Ok(account)
    }

    /// Like [`Accounts::fetch`], but a missing account is an error.
    pub fn require(&self, id: &str) -> Result<Account> {
        self.fetch(id)?.ok_or_else(|| AttendanceError::account_not_found(id).into())
    }

    pub fn fetch_by_school_id(&self, school_id: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                &format!("{} WHERE school_id = ?1", SELECT_ACCOUNTS),
                params![school_id],
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Resolves either an account id or a school id.
    pub fn find(&self, key: &str) -> Result<Account> {
        match self.fetch(key)? {
            Some(account) => Ok(account),
            None => self
                .fetch_by_school_id(key)?
                .ok_or_else(|| AttendanceError::account_not_found(key).into()),
        }
    }

    /// All accounts ordered by name.
    pub fn fetch_all(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{} ORDER BY name, id", SELECT_ACCOUNTS))?;
        let accounts = stmt.query_map([], account_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    /// Sets or clears the job of an account.
    pub fn assign_job(&self, id: &str, job: Option<&JobReference>) -> Result<Account> {
        {
            let conn = self.conn.lock();
            let updated = conn.execute(UPDATE_JOB, params![job.map(|j| j.id), job.map(|j| j.name.as_str()), id])?;
            if updated == 0 {
                return Err(AttendanceError::account_not_found(id).into());
            }
        }
        debug!(id, job = ?job.map(|j| j.id), "assigned job");
        self.require(id)
    }
}
