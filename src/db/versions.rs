//! Per-account version counters.
//!
//! Every write that touches an account's activities or adjustments bumps the
//! account's counter inside the same transaction. Readers compare the
//! version a snapshot was taken at with the current one to detect stale
//! aggregates.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

const BUMP_VERSION: &str = "INSERT INTO account_versions (account_id, version) VALUES (?1, 1)
    ON CONFLICT(account_id) DO UPDATE SET version = version + 1";
const SELECT_VERSION: &str = "SELECT version FROM account_versions WHERE account_id = ?1";

/// Increments the version of `account_id` and returns the new value.
pub fn bump_version(conn: &Connection, account_id: &str) -> Result<u64> {
    conn.execute(BUMP_VERSION, params![account_id])?;
    current_version(conn, account_id)
}

pub fn current_version(conn: &Connection, account_id: &str) -> Result<u64> {
    let version: Option<i64> = conn
        .query_row(SELECT_VERSION, params![account_id], |row| row.get(0))
        .optional()?;
    Ok(version.unwrap_or(0) as u64)
}
