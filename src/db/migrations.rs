//! Database schema migration management and versioning.
//!
//! Every schema change is a numbered migration. Pending migrations run in
//! order inside one transaction when the database is opened, and each applied
//! version is recorded in the `migrations` table.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clockin::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("clockin.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

/// Tracking table for applied migrations.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of all migrations, in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: roster and activity records
        self.add_migration(1, "create_accounts_and_activities", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS accounts (
                    id TEXT NOT NULL PRIMARY KEY,
                    school_id TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    job_id INTEGER,
                    job_name TEXT,
                    profile_picture TEXT,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS activities (
                    id INTEGER NOT NULL PRIMARY KEY,
                    account_id TEXT NOT NULL,
                    job_id INTEGER,
                    job_name TEXT,
                    time_in TIMESTAMP NOT NULL,
                    time_out TIMESTAMP,
                    invalidated_at TIMESTAMP,
                    invalidation_notes TEXT,
                    created_at TIMESTAMP NOT NULL,
                    FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
                )",
                [],
            )?;

            tx.execute("CREATE INDEX IF NOT EXISTS idx_activities_account ON activities(account_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_activities_time_in ON activities(time_in)", [])?;
            // Backstop for the one-open-session-per-account rule.
            tx.execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_activities_one_open
                 ON activities(account_id) WHERE time_out IS NULL AND invalidated_at IS NULL",
                [],
            )?;
            Ok(())
        });

        // Version 2: manual credit/deduction of minutes
        self.add_migration(2, "add_time_adjustments", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS time_adjustments (
                    id INTEGER PRIMARY KEY,
                    account_id TEXT NOT NULL,
                    minutes INTEGER NOT NULL,
                    reason TEXT NOT NULL,
                    created_at TIMESTAMP NOT NULL,
                    FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
                )",
                [],
            )?;
            tx.execute("CREATE INDEX idx_time_adjustments_account ON time_adjustments(account_id)", [])?;
            Ok(())
        });

        // Version 3: per-account version counters for cached aggregates
        self.add_migration(3, "add_account_versions", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS account_versions (
                    account_id TEXT NOT NULL PRIMARY KEY,
                    version INTEGER NOT NULL DEFAULT 0
                )",
                [],
            )?;
            Ok(())
        });

        // Version 4: mark sessions closed by the nightly job
        self.add_migration(4, "add_auto_closed_flag", |tx| {
            tx.execute("ALTER TABLE activities ADD COLUMN auto_closed BOOLEAN NOT NULL DEFAULT FALSE", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the recorded schema version.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!("Database is up to date");
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let tracked: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'migrations')",
            [],
            |row| row.get(0),
        )?;
        if !tracked {
            return Ok(0);
        }
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;
        Ok(version.unwrap_or(0))
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}
