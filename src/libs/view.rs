use super::account::Account;
use super::activity::ActivityRecord;
use super::duration::record_duration;
use super::formatter::{format_hours, format_minutes, format_optional_timestamp, format_record_duration, format_signed_minutes, format_timestamp};
use super::performance::{LeaderboardEntry, PerformanceStat};
use super::status::classify;
use super::workflow::AttendanceSummary;
use crate::db::adjustments::TimeAdjustment;
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// Activity records with their status and duration as of `now`.
    pub fn activities(records: &[ActivityRecord], now: &DateTime<FixedOffset>) -> Result<()> {
        let tz = now.timezone();
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "JOB", "TIME IN", "TIME OUT", "DURATION", "STATUS", "NOTES"]);
        for record in records {
            let status = classify(record, now);
            let notes = match (&record.invalidation_notes, record.auto_closed) {
                (Some(notes), _) => notes.clone(),
                (None, true) => String::from("auto-closed"),
                (None, false) => String::new(),
            };
            table.add_row(row![
                record.id,
                record.account_name,
                record.job_name().unwrap_or("-"),
                format_timestamp(&record.time_in, &tz),
                format_optional_timestamp(record.time_out.as_ref(), &tz),
                r->format_record_duration(&record_duration(record, now)),
                status,
                notes
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn performance(stats: &[PerformanceStat]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["SCHOOL ID", "NAME", "JOB", "ONLINE", "TOTAL", "AVG/DAY", "AVG/WEEK", "ADJUSTED"]);
        for stat in stats {
            table.add_row(row![
                stat.school_id,
                stat.name,
                stat.job_name.as_deref().unwrap_or("-"),
                if stat.is_online { "yes" } else { "no" },
                r->format!("{:.2}", stat.total_rendered_hours),
                r->format_hours(stat.avg_daily_hours),
                r->format_hours(stat.avg_weekly_hours),
                r->format!("{:+.2}", stat.adjustment_hours)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn leaderboard(entries: &[LeaderboardEntry]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["#", "SCHOOL ID", "NAME", "JOB", "TOTAL", "SESSIONS", "ONLINE"]);
        for entry in entries {
            table.add_row(row![
                r->entry.rank,
                entry.school_id,
                entry.name,
                entry.job_name.as_deref().unwrap_or("-"),
                r->format_minutes(entry.total_minutes),
                r->entry.completed_count,
                if entry.is_online { "yes" } else { "no" }
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn summary(summaries: &[AttendanceSummary]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ACCOUNT", "NAME", "SESSIONS", "RENDERED"]);
        for summary in summaries {
            table.add_row(row![
                summary.account_id,
                summary.name,
                r->summary.sessions,
                r->format_minutes(summary.completed_minutes)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn accounts(accounts: &[Account]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "SCHOOL ID", "NAME", "JOB"]);
        for account in accounts {
            table.add_row(row![
                account.id,
                account.school_id,
                account.name,
                account.job.as_ref().map(|j| j.name.as_str()).unwrap_or("-")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn adjustments(adjustments: &[TimeAdjustment], tz: &FixedOffset) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "MINUTES", "REASON", "CREATED"]);
        for adjustment in adjustments {
            table.add_row(row![
                adjustment.id,
                r->format_signed_minutes(adjustment.minutes),
                adjustment.reason,
                format_timestamp(&adjustment.created_at, tz)
            ]);
        }
        table.printstd();

        Ok(())
    }
}
