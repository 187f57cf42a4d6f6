//! Kiosk punch: times a person in, or out when they have an active session.

use crate::{
    db::{accounts::Accounts, activities::Activities},
    libs::{
        config::Config,
        duration::record_duration,
        formatter::{format_record_duration, format_timestamp},
        messages::Message,
        workflow::{punch, PunchOutcome},
    },
    msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct PunchArgs {
    /// School id (or account id) of the person
    school_id: String,

    /// Time out even if the session is shorter than the minimum; the session
    /// is then invalidated
    #[arg(long, short)]
    force: bool,
}

pub fn cmd(args: PunchArgs) -> Result<()> {
    let settings = Config::read()?.attendance();
    let now = settings.now()?;

    let account = Accounts::new()?.find(&args.school_id)?;
    let activities = Activities::new()?.with_invalidation_fill(settings.invalidation_fill_minutes);

    match punch(&activities, &account, settings.min_session_minutes, &now, args.force)? {
        PunchOutcome::TimedIn(record) => {
            msg_success!(Message::TimedIn(account.name, format_timestamp(&record.time_in, &now.timezone())));
        }
        PunchOutcome::TimedOut(record) => {
            let rendered = format_record_duration(&record_duration(&record, &now));
            msg_success!(Message::TimedOut(account.name, rendered));
        }
        PunchOutcome::TimedOutEarly(_) => {
            msg_warning!(Message::TimedOutEarly(account.name, settings.min_session_minutes));
        }
    }

    Ok(())
}
