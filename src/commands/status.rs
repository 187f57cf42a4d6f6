//! Who is online right now, and how many sessions were left open.

use crate::{
    db::activities::Activities,
    libs::{
        config::Config,
        messages::Message,
        status::{classify, count_overdue, ActivityStatus},
        view::View,
    },
    msg_info, msg_warning,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Also list the overdue sessions
    #[arg(long)]
    overdue: bool,
}

pub fn cmd(args: StatusArgs) -> Result<()> {
    let now = Config::read()?.attendance().now()?;
    let open = Activities::new()?.fetch_open()?;

    let (active, overdue): (Vec<_>, Vec<_>) = open
        .into_iter()
        .partition(|r| classify(r, &now) == ActivityStatus::Active);

    msg_info!(Message::ActiveCount(active.len()), true);
    if !active.is_empty() {
        View::activities(&active, &now)?;
    }

    let overdue_count = count_overdue(&overdue, &now);
    if overdue_count > 0 {
        msg_warning!(Message::OverdueCount(overdue_count), true);
        if args.overdue {
            View::activities(&overdue, &now)?;
        }
    }

    Ok(())
}
