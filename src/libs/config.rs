//! Configuration management for clockin.
//!
//! Settings are stored as pretty-printed JSON (`config.json`) in the data
//! directory resolved by [`DataStorage`]. Every module is optional; a missing
//! file or a missing section means defaults.
//!
//! ## Attendance settings
//!
//! | key | default | meaning |
//! |-----|---------|---------|
//! | `utc_offset_minutes` | `480` | offset of the local calendar used for "today" |
//! | `min_session_minutes` | `10` | shortest session a time-out accepts without `--force` |
//! | `invalidation_fill_minutes` | `30` | time-out filled in when an open record is invalidated |
//! | `auto_close_hour` | `23` | local hour at which open sessions are closed nightly |
//!
//! ```rust,no_run
//! use clockin::libs::config::Config;
//!
//! let config = Config::read()?;
//! let attendance = config.attendance();
//! println!("now: {}", attendance.now()?);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Attendance policy settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AttendanceConfig {
    /// Offset from UTC, in minutes, of the calendar that decides "today".
    pub utc_offset_minutes: i32,

    /// Sessions shorter than this are refused at time-out unless forced.
    pub min_session_minutes: i64,

    /// Minutes after time-in used as time-out when an open record is
    /// invalidated.
    pub invalidation_fill_minutes: i64,

    /// Local hour (0-23) of the nightly auto-close cutoff.
    pub auto_close_hour: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        AttendanceConfig {
            utc_offset_minutes: 8 * 60,
            min_session_minutes: 10,
            invalidation_fill_minutes: 30,
            auto_close_hour: 23,
        }
    }
}

impl AttendanceConfig {
    /// The configured local offset.
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .with_context(|| format!("{}", Message::InvalidUtcOffset(self.utc_offset_minutes)))
    }

    /// The current instant on the configured local calendar.
    pub fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Utc::now().with_timezone(&self.offset()?))
    }

    /// Expresses `instant` on the configured local calendar.
    pub fn localize(&self, instant: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
        Ok(instant.with_timezone(&self.offset()?))
    }
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<AttendanceConfig>,
}

impl Config {
    /// Reads the configuration from the data directory, or defaults when
    /// there is no file yet.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Attendance settings, falling back to defaults.
    pub fn attendance(&self) -> AttendanceConfig {
        self.attendance.clone().unwrap_or_default()
    }

    /// Interactive setup, starting from the current values.
    pub fn init() -> Result<Self> {
        let mut config = Config::read()?;
        let current = config.attendance();
        let theme = ColorfulTheme::default();

        msg_print!(Message::ConfigModuleAttendance, true);

        let utc_offset_minutes: i32 = Input::with_theme(&theme)
            .with_prompt(Message::PromptUtcOffset.to_string())
            .default(current.utc_offset_minutes)
            .validate_with(|v: &i32| -> Result<(), String> {
                if (-14 * 60..=14 * 60).contains(v) {
                    Ok(())
                } else {
                    Err(Message::InvalidUtcOffset(*v).to_string())
                }
            })
            .interact_text()?;
        let min_session_minutes: i64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptMinSessionMinutes.to_string())
            .default(current.min_session_minutes)
            .interact_text()?;
        let invalidation_fill_minutes: i64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptInvalidationFillMinutes.to_string())
            .default(current.invalidation_fill_minutes)
            .interact_text()?;
        let auto_close_hour: u32 = Input::with_theme(&theme)
            .with_prompt(Message::PromptAutoCloseHour.to_string())
            .default(current.auto_close_hour)
            .validate_with(|v: &u32| -> Result<(), String> {
                if *v < 24 {
                    Ok(())
                } else {
                    Err(Message::InvalidAutoCloseHour(*v).to_string())
                }
            })
            .interact_text()?;

        config.attendance = Some(AttendanceConfig {
            utc_offset_minutes,
            min_session_minutes,
            invalidation_fill_minutes,
            auto_close_hour,
        });
        Ok(config)
    }
}
