//! Nightly close of forgotten sessions. Meant to be run from cron shortly
//! after the configured cutoff hour.

use crate::{
    db::activities::Activities,
    libs::{config::Config, formatter::format_timestamp, messages::Message, workflow::auto_close_cutoff},
    msg_bail_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct AutoCloseArgs {
    /// Local cutoff hour, overriding the configured one
    #[arg(long)]
    hour: Option<u32>,
}

pub fn cmd(args: AutoCloseArgs) -> Result<()> {
    let settings = Config::read()?.attendance();
    let now = settings.now()?;
    let hour = args.hour.unwrap_or(settings.auto_close_hour);

    let Some(cutoff) = auto_close_cutoff(&now, hour) else {
        msg_bail_anyhow!(Message::InvalidAutoCloseHour(hour));
    };

    let closed = Activities::new()?.auto_close(cutoff)?;
    if closed.is_empty() {
        msg_info!(Message::NothingToAutoClose);
    } else {
        msg_success!(Message::AutoClosed(closed.len(), format_timestamp(&cutoff, &now.timezone())));
    }

    Ok(())
}
