//! Core library modules for clockin.
//!
//! The attendance core is pure: [`status`] classifies a record at an instant,
//! [`duration`] measures it, and [`performance`] folds a person's records
//! into statistics. [`workflow`] connects the core to a
//! [`store::RecordStore`]. The remaining modules are configuration,
//! messaging and terminal/file output.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use clockin::libs::activity::ActivityRecord;
//! use clockin::libs::status::{classify, ActivityStatus};
//!
//! let time_in = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
//! let record = ActivityRecord::open(1, "42", "Ada", None, time_in);
//! let now = Utc.with_ymd_and_hms(2024, 3, 4, 2, 0, 0).unwrap();
//! assert_eq!(classify(&record, &now), ActivityStatus::Active);
//! ```

pub mod account;
pub mod activity;
pub mod config;
pub mod data_storage;
pub mod duration;
pub mod error;
pub mod export;
pub mod formatter;
pub mod messages;
pub mod performance;
pub mod status;
pub mod store;
pub mod view;
pub mod workflow;
