//! SQLite persistence for clockin.
//!
//! One database file (`clockin.db` in the data directory) holds the roster,
//! the activity records, manual time adjustments and per-account version
//! counters. The schema is versioned by [`migrations`]; every store opens the
//! database through [`db::Db`], which brings it up to date first.
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use clockin::db::{accounts::Accounts, activities::Activities};
//! use clockin::libs::account::Account;
//! use clockin::libs::store::RecordStore;
//!
//! let accounts = Accounts::new()?;
//! accounts.insert(&Account::new("42", "2021-0042", "Ada"))?;
//!
//! let activities = Activities::new()?;
//! let record = activities.open_record("42", None, Utc::now())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection setup and schema initialization.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

/// People who can clock in, and their job assignments.
pub mod accounts;

/// Activity records: the [`RecordStore`](crate::libs::store::RecordStore)
/// implementation plus listing, bulk operations and auto-close.
pub mod activities;

/// Manual credits and deductions of rendered time.
pub mod adjustments;

/// Per-account version counters.
pub mod versions;
