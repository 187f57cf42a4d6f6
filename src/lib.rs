//! # clockin
//!
//! Attendance tracking for student workers and staff: time in and out at a
//! kiosk, review and correct sessions, and report rendered hours.
//!
//! ## Features
//!
//! - **Punch toggle**: one command times a person in or out
//! - **Status**: every record is Active, Overdue, Completed or Invalidated
//!   at a given instant
//! - **Corrections**: close, invalidate (with a reason) or delete sessions,
//!   singly or in bulk; nightly auto-close of forgotten sessions
//! - **Performance**: total rendered hours, daily and weekly averages,
//!   online status, manual time adjustments
//! - **Export**: CSV and JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clockin::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
