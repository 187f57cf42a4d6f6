//! Text of every user-facing [`Message`].
//!
//! All wording lives here so commands only pick a variant and its
//! parameters.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            // === CONFIG MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleAttendance => "Attendance settings".to_string(),
            Message::PromptUtcOffset => "UTC offset of the local calendar, in minutes".to_string(),
            Message::PromptMinSessionMinutes => "Minimum session length, in minutes".to_string(),
            Message::PromptInvalidationFillMinutes => "Minutes credited to an open record when it is invalidated".to_string(),
            Message::PromptAutoCloseHour => "Hour (0-23) at which open sessions are closed".to_string(),
            Message::InvalidUtcOffset(minutes) => format!("Invalid UTC offset: {} minutes (allowed -840..=840)", minutes),
            Message::InvalidAutoCloseHour(hour) => format!("Invalid auto-close hour: {} (allowed 0-23)", hour),

            // === ACCOUNT MESSAGES ===
            Message::AccountCreated(name) => format!("Account '{}' created", name),
            Message::AccountsNotFound => "No accounts found".to_string(),
            Message::JobAssigned(name, job) => format!("{} is now assigned to '{}'", name, job),
            Message::JobCleared(name) => format!("Job assignment of {} cleared", name),
            Message::JobNameRequired => "A job name is required together with a job id".to_string(),

            // === PUNCH MESSAGES ===
            Message::TimedIn(name, time) => format!("{} timed in at {}", name, time),
            Message::TimedOut(name, duration) => format!("{} timed out after {}", name, duration),
            Message::TimedOutEarly(name, minimum) => {
                format!("{} timed out before {} minutes; the session was invalidated", name, minimum)
            }

            // === ACTIVITY MESSAGES ===
            Message::ActivitiesNotFound => "No activities found".to_string(),
            Message::ActivitiesHeader => "Activities".to_string(),
            Message::ActivitiesClosed(count) => format!("{} activities timed out", count),
            Message::ActivitiesInvalidated(count) => format!("{} activities invalidated", count),
            Message::ActivitiesDeleted(count) => format!("{} activities deleted", count),
            Message::ActivitiesToBeChanged => "The following activities will be changed:".to_string(),
            Message::ConfirmInvalidateActivities(count) => format!("Invalidate {} activities?", count),
            Message::ConfirmDeleteActivities(count) => format!("Permanently delete {} activities?", count),
            Message::PromptInvalidationReason => "Reason for invalidation".to_string(),
            Message::OverdueCount(count) => format!("{} overdue sessions need attention", count),
            Message::ActiveCount(count) => format!("{} people are currently online", count),
            Message::AutoClosed(count, cutoff) => format!("{} open sessions closed at {}", count, cutoff),
            Message::NothingToAutoClose => "No open sessions before the cutoff".to_string(),

            // === ADJUSTMENT MESSAGES ===
            Message::AdjustmentRecorded(name, duration) => format!("Adjusted {} by {}", name, duration),
            Message::AdjustmentDeleted(id) => format!("Adjustment #{} deleted", id),
            Message::AdjustmentsNotFound(name) => format!("No time adjustments for {}", name),
            Message::PromptAdjustmentReason => "Reason for the adjustment".to_string(),

            // === PERFORMANCE / SUMMARY MESSAGES ===
            Message::PerformanceHeader(filter) => format!("Performance ({})", filter),
            Message::PerformanceEmpty => "No people match the filter".to_string(),
            Message::SummaryHeader(from, to) => format!("Attendance from {} to {}", from, to),
            Message::SummaryEmpty => "No attendance in this period".to_string(),
            Message::LeaderboardHeader(count) => format!("Top {} by rendered time", count),
            Message::LeaderboardEmpty => "Nobody has rendered time yet".to_string(),
            Message::ExportCompleted(path) => format!("Export completed: {}", path),

            // === DATABASE MESSAGES ===
            Message::DatabaseVersion(version) => format!("Database schema version: {}", version),
            Message::DatabaseNeedsUpdate => "Database schema needs an update".to_string(),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::MigrationsFound(count) => format!("Found {} pending migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::AllMigrationsCompleted => "All migrations completed".to_string(),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),

            // === GENERAL ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
            Message::InvalidDate(input) => format!("Invalid date '{}', expected YYYY-MM-DD or 'today'", input),
            Message::InvalidDateRange(from, to) => format!("Invalid date range: {} is after {}", from, to),
        };
        write!(f, "{}", s)
    }
}
