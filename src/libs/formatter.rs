//! Display formatting for durations and hours.
//!
//! All durations render as `HH:MM`. A provisional value (the running time of
//! an open session) carries a trailing `*`, and a duration that could not be
//! computed renders as `--` so it never reads as zero.
//!
//! ```rust
//! use clockin::libs::duration::RecordDuration;
//! use clockin::libs::formatter::{format_minutes, format_record_duration};
//!
//! assert_eq!(format_minutes(540), "09:00");
//! assert_eq!(format_record_duration(&RecordDuration::Provisional(65)), "01:05*");
//! assert_eq!(format_record_duration(&RecordDuration::Unavailable), "--");
//! ```

use super::duration::{DurationParts, RecordDuration};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// Formats whole minutes as `HH:MM`; negative input renders as `00:00`.
pub fn format_minutes(minutes: i64) -> String {
    let parts = DurationParts::from_minutes(minutes.max(0));
    format!("{:02}:{:02}", parts.hours, parts.minutes)
}

pub fn format_record_duration(duration: &RecordDuration) -> String {
    match duration {
        RecordDuration::Final(minutes) => format_minutes(*minutes),
        RecordDuration::Provisional(minutes) => format!("{}*", format_minutes(*minutes)),
        RecordDuration::Unavailable => String::from("--"),
    }
}

/// Fractional hours as `HH:MM`, rounding the minutes.
pub fn format_hours(hours: f64) -> String {
    let parts = DurationParts::from_hours(hours.max(0.0));
    format!("{:02}:{:02}", parts.hours, parts.minutes)
}

/// Signed minutes, e.g. `+01:30` or `-00:45`.
pub fn format_signed_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { '-' } else { '+' };
    format!("{}{}", sign, format_minutes(minutes.abs()))
}

/// A timestamp on the local calendar of `tz`, `YYYY-MM-DD HH:MM`.
pub fn format_timestamp<Tz>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}

/// Optional timestamp; a missing one renders as `-`.
pub fn format_optional_timestamp<Tz>(instant: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.map(|t| format_timestamp(t, tz)).unwrap_or_else(|| String::from("-"))
}
