//! Listing and correction of activity records.
//!
//! `close`, `invalidate` and `delete` take one or more ids and apply to all
//! of them or to none. Invalidation and deletion ask for confirmation unless
//! `--yes` is given.

use super::{local_range, parse_date};
use crate::{
    db::{
        accounts::Accounts,
        activities::{Activities, ActivityFilter},
    },
    libs::{
        activity::ActivityRecord,
        config::{AttendanceConfig, Config},
        messages::Message,
        status::{classify, ActivityStatus},
        store::RecordStore,
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

#[derive(Debug, Args)]
pub struct ActivityArgs {
    #[command(subcommand)]
    command: ActivityCommand,
}

#[derive(Debug, Subcommand)]
enum ActivityCommand {
    /// List activities, open ones first
    List {
        /// Account id or school id
        #[arg(long, short)]
        account: Option<String>,
        /// First local date (YYYY-MM-DD or 'today')
        #[arg(long)]
        from: Option<String>,
        /// Last local date, defaults to --from
        #[arg(long)]
        to: Option<String>,
        /// Only sessions that are active right now
        #[arg(long)]
        active: bool,
    },
    /// Time out open activities now
    Close {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Invalidate activities, keeping them for audit
    Invalidate {
        #[arg(required = true)]
        ids: Vec<i64>,
        #[arg(long, short)]
        reason: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete activities permanently
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn open_store(settings: &AttendanceConfig) -> Result<Activities> {
    Ok(Activities::new()?.with_invalidation_fill(settings.invalidation_fill_minutes))
}

/// Shows the records about to change and asks for confirmation.
fn confirm(activities: &Activities, ids: &[i64], prompt: Message, now: &DateTime<FixedOffset>) -> Result<bool> {
    let mut records: Vec<ActivityRecord> = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = activities.record(*id)? {
            records.push(record);
        }
    }

    msg_print!(Message::ActivitiesToBeChanged, true);
    View::activities(&records, now)?;

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(false)
        .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
    }
    Ok(confirmed)
}

pub fn cmd(args: ActivityArgs) -> Result<()> {
    let settings = Config::read()?.attendance();
    let now = settings.now()?;
    let activities = open_store(&settings)?;

    match args.command {
        ActivityCommand::List { account, from, to, active } => {
            let mut filter = ActivityFilter::default();
            if let Some(key) = account {
                filter.account_id = Some(Accounts::new()?.find(&key)?.id);
            }
            if let Some(from) = from {
                let from = parse_date(&from, &now)?;
                let to = match to {
                    Some(to) => parse_date(&to, &now)?,
                    None => from,
                };
                let (start, end) = local_range(from, to, &settings.offset()?)?;
                filter.from = Some(start);
                filter.to = Some(end);
            }

            let mut records = activities.fetch(&filter)?;
            if active {
                records.retain(|r| classify(r, &now) == ActivityStatus::Active);
            }
            if records.is_empty() {
                msg_info!(Message::ActivitiesNotFound);
                return Ok(());
            }

            msg_print!(Message::ActivitiesHeader, true);
            View::activities(&records, &now)?;
        }
        ActivityCommand::Close { ids } => {
            let closed = activities.bulk_close(&ids, now.with_timezone(&Utc))?;
            msg_success!(Message::ActivitiesClosed(closed));
        }
        ActivityCommand::Invalidate { ids, reason, yes } => {
            let reason = match reason {
                Some(reason) => reason,
                None => Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptInvalidationReason.to_string())
                    .interact_text()?,
            };
            if !yes && !confirm(&activities, &ids, Message::ConfirmInvalidateActivities(ids.len()), &now)? {
                return Ok(());
            }
            let invalidated = activities.bulk_invalidate(&ids, &reason, now.with_timezone(&Utc))?;
            msg_success!(Message::ActivitiesInvalidated(invalidated));
        }
        ActivityCommand::Delete { ids, yes } => {
            if !yes && !confirm(&activities, &ids, Message::ConfirmDeleteActivities(ids.len()), &now)? {
                return Ok(());
            }
            let deleted = activities.bulk_delete(&ids)?;
            msg_success!(Message::ActivitiesDeleted(deleted));
        }
    }

    Ok(())
}
