//! Attendance domain errors.
//!
//! Store and workflow operations return `anyhow::Result`, like the rest of the
//! application, but every rejection they raise on purpose is an
//! [`AttendanceError`]. Callers that need to react to a specific failure can
//! recover it with `err.downcast_ref::<AttendanceError>()`.

use thiserror::Error;

/// A rejected operation; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("time out must be after time in")]
    TimeOutNotAfterTimeIn,

    #[error("a reason is required to invalidate an activity")]
    MissingReason,

    #[error("a reason is required for a time adjustment")]
    MissingAdjustmentReason,

    #[error("account {account_id} already has an open activity (#{open_id})")]
    AlreadyOpen { account_id: String, open_id: i64 },

    #[error("activity #{0} has already been timed out")]
    AlreadyClosed(i64),

    #[error("activity #{0} is already invalidated")]
    AlreadyInvalidated(i64),

    #[error("session lasted {minutes} minutes, less than the {minimum} minute minimum")]
    EarlyTimeout { minutes: i64, minimum: i64 },

    #[error("account {0} has no job assigned")]
    NoJobAssigned(String),

    #[error("account {account_id} has an overdue activity (#{open_id}) that must be corrected first")]
    OverdueSessionPending { account_id: String, open_id: i64 },

    #[error("no activities selected")]
    EmptySelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Stale data for account {account_id}: read version {seen}, store is at version {current}")]
    StaleData { account_id: String, seen: u64, current: u64 },
}

impl AttendanceError {
    pub fn activity_not_found(id: i64) -> Self {
        AttendanceError::NotFound {
            entity: "Activity",
            id: id.to_string(),
        }
    }

    pub fn account_not_found(id: &str) -> Self {
        AttendanceError::NotFound {
            entity: "Account",
            id: id.to_string(),
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            AttendanceError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Extracts the domain error behind an `anyhow::Error`, if there is one.
pub fn attendance_error(err: &anyhow::Error) -> Option<&AttendanceError> {
    err.downcast_ref::<AttendanceError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_violation() {
        let err = AttendanceError::from(ValidationError::AlreadyOpen {
            account_id: "42".to_string(),
            open_id: 7,
        });
        assert_eq!(
            err.to_string(),
            "Validation failed: account 42 already has an open activity (#7)"
        );
        assert_eq!(AttendanceError::activity_not_found(9).to_string(), "Activity 9 not found");
    }

    #[test]
    fn test_round_trips_through_anyhow() {
        let err: anyhow::Error = AttendanceError::from(ValidationError::MissingReason).into();
        let domain = attendance_error(&err).unwrap();
        assert_eq!(domain.validation(), Some(&ValidationError::MissingReason));
    }
}
