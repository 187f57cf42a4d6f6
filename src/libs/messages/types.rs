#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIG MESSAGES ===
    ConfigSaved,
    ConfigModuleAttendance,
    PromptUtcOffset,
    PromptMinSessionMinutes,
    PromptInvalidationFillMinutes,
    PromptAutoCloseHour,
    InvalidUtcOffset(i32),
    InvalidAutoCloseHour(u32),

    // === ACCOUNT MESSAGES ===
    AccountCreated(String),     // name
    AccountsNotFound,
    JobAssigned(String, String), // name, job
    JobCleared(String),          // name
    JobNameRequired,

    // === PUNCH MESSAGES ===
    TimedIn(String, String),  // name, local time
    TimedOut(String, String), // name, duration
    TimedOutEarly(String, i64), // name, minimum minutes

    // === ACTIVITY MESSAGES ===
    ActivitiesNotFound,
    ActivitiesHeader,
    ActivitiesClosed(usize),
    ActivitiesInvalidated(usize),
    ActivitiesDeleted(usize),
    ActivitiesToBeChanged,
    ConfirmInvalidateActivities(usize),
    ConfirmDeleteActivities(usize),
    PromptInvalidationReason,
    OverdueCount(usize),
    ActiveCount(usize),
    AutoClosed(usize, String), // count, cutoff
    NothingToAutoClose,

    // === ADJUSTMENT MESSAGES ===
    AdjustmentRecorded(String, String), // name, signed duration
    AdjustmentDeleted(i64),
    AdjustmentsNotFound(String),
    PromptAdjustmentReason,

    // === PERFORMANCE / SUMMARY MESSAGES ===
    PerformanceHeader(String), // filter
    PerformanceEmpty,
    SummaryHeader(String, String), // from, to
    SummaryEmpty,
    LeaderboardHeader(usize), // entries shown
    LeaderboardEmpty,
    ExportCompleted(String),

    // === DATABASE MESSAGES ===
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationHistory,
    MigrationsFound(usize),
    RunningMigration(u32, String),
    AllMigrationsCompleted,
    MigrationFailed(u32, String),

    // === GENERAL ===
    OperationCancelled,
    InvalidDate(String),
    InvalidDateRange(String, String),
}
