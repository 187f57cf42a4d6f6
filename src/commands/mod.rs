pub mod account;
pub mod activity;
pub mod adjust;
pub mod auto_close;
pub mod init;
pub mod leaderboard;
pub mod migrations;
pub mod perf;
pub mod punch;
pub mod status;
pub mod summary;

use crate::libs::messages::Message;
use crate::msg_bail_anyhow;
use anyhow::Result;
use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Manage the roster of accounts", arg_required_else_help = true)]
    Account(account::AccountArgs),
    #[command(about = "Time an account in, or out if it has an active session")]
    Punch(punch::PunchArgs),
    #[command(about = "List and correct activity records", arg_required_else_help = true)]
    Activity(activity::ActivityArgs),
    #[command(about = "Credit or deduct rendered time", arg_required_else_help = true)]
    Adjust(adjust::AdjustArgs),
    #[command(about = "Show performance per person")]
    Perf(perf::PerfArgs),
    #[command(about = "Rank people by rendered time")]
    Leaderboard(leaderboard::LeaderboardArgs),
    #[command(about = "Show attendance per person for a period")]
    Summary(summary::SummaryArgs),
    #[command(about = "Show who is online and how many sessions are overdue")]
    Status(status::StatusArgs),
    #[command(about = "Close sessions left open past the nightly cutoff")]
    AutoClose(auto_close::AutoCloseArgs),
    #[command(about = "Inspect the database schema", arg_required_else_help = true)]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Account(args) => account::cmd(args),
            Commands::Punch(args) => punch::cmd(args),
            Commands::Activity(args) => activity::cmd(args),
            Commands::Adjust(args) => adjust::cmd(args),
            Commands::Perf(args) => perf::cmd(args),
            Commands::Leaderboard(args) => leaderboard::cmd(args),
            Commands::Summary(args) => summary::cmd(args),
            Commands::Status(args) => status::cmd(args),
            Commands::AutoClose(args) => auto_close::cmd(args),
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}

/// Parses `YYYY-MM-DD` or `today` (the local date of `now`).
pub fn parse_date(input: &str, now: &DateTime<FixedOffset>) -> Result<NaiveDate> {
    if input.eq_ignore_ascii_case("today") {
        return Ok(now.date_naive());
    }
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => msg_bail_anyhow!(Message::InvalidDate(input.to_string())),
    }
}

/// UTC bounds covering the local dates `from` through `to`, both inclusive.
pub fn local_range(from: NaiveDate, to: NaiveDate, tz: &FixedOffset) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    if from > to {
        msg_bail_anyhow!(Message::InvalidDateRange(from.to_string(), to.to_string()));
    }
    let Some(after_to) = to.checked_add_days(Days::new(1)) else {
        msg_bail_anyhow!(Message::InvalidDate(to.to_string()));
    };

    let start = tz.from_local_datetime(&from.and_time(NaiveTime::MIN)).earliest();
    let end = tz.from_local_datetime(&after_to.and_time(NaiveTime::MIN)).earliest();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start.with_timezone(&Utc), end.with_timezone(&Utc) - Duration::milliseconds(1))),
        _ => msg_bail_anyhow!(Message::InvalidDateRange(from.to_string(), to.to_string())),
    }
}
