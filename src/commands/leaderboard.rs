//! Ranking of people by rendered time.

use super::{local_range, parse_date};
use crate::{
    db::{accounts::Accounts, activities::Activities, adjustments::Adjustments},
    libs::{
        config::Config,
        messages::Message,
        performance::{leaderboard, TimeWindow, LEADERBOARD_DEFAULT_LIMIT},
        view::View,
    },
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    /// How many people to show, at most 100
    #[arg(long, short, default_value_t = LEADERBOARD_DEFAULT_LIMIT)]
    limit: usize,

    /// Only count time from this local date on (YYYY-MM-DD or 'today')
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Only count time up to this local date (YYYY-MM-DD or 'today')
    #[arg(long, requires = "from")]
    to: Option<String>,
}

pub fn cmd(args: LeaderboardArgs) -> Result<()> {
    let settings = Config::read()?.attendance();
    let now = settings.now()?;

    let window = match (args.from, args.to) {
        (Some(from), Some(to)) => {
            let (from, to) = local_range(parse_date(&from, &now)?, parse_date(&to, &now)?, &settings.offset()?)?;
            Some(TimeWindow { from, to })
        }
        _ => None,
    };

    let accounts = Accounts::new()?.fetch_all()?;
    let records = Activities::new()?.fetch_all()?;
    let adjustments = match &window {
        Some(window) => Adjustments::new()?.totals_between(window.from, window.to)?,
        None => Adjustments::new()?.totals_by_account()?,
    };

    let entries = leaderboard(&accounts, &records, &adjustments, window.as_ref(), args.limit, &now);
    if entries.is_empty() {
        msg_info!(Message::LeaderboardEmpty);
        return Ok(());
    }

    msg_print!(Message::LeaderboardHeader(entries.len()), true);
    View::leaderboard(&entries)?;

    Ok(())
}
