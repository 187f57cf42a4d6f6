use crate::{
    db::{accounts::Accounts, adjustments::Adjustments},
    libs::{config::Config, formatter::format_signed_minutes, messages::Message, view::View},
    msg_info, msg_success,
};
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input};

#[derive(Debug, Args)]
pub struct AdjustArgs {
    #[command(subcommand)]
    command: AdjustCommand,
}

#[derive(Debug, Subcommand)]
enum AdjustCommand {
    /// Credit (positive) or deduct (negative) minutes
    Add {
        /// Account id or school id
        account: String,
        #[arg(long, short, allow_hyphen_values = true)]
        minutes: i64,
        #[arg(long, short)]
        reason: Option<String>,
    },
    /// List the adjustments of an account
    List {
        /// Account id or school id
        account: String,
    },
    /// Remove an adjustment
    Delete { id: i64 },
}

pub fn cmd(args: AdjustArgs) -> Result<()> {
    let adjustments = Adjustments::new()?;

    match args.command {
        AdjustCommand::Add { account, minutes, reason } => {
            let account = Accounts::new()?.find(&account)?;
            let reason = match reason {
                Some(reason) => reason,
                None => Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptAdjustmentReason.to_string())
                    .interact_text()?,
            };
            let adjustment = adjustments.insert(&account.id, minutes, &reason, Utc::now())?;
            msg_success!(Message::AdjustmentRecorded(account.name, format_signed_minutes(adjustment.minutes)));
        }
        AdjustCommand::List { account } => {
            let account = Accounts::new()?.find(&account)?;
            let list = adjustments.fetch_for_account(&account.id)?;
            if list.is_empty() {
                msg_info!(Message::AdjustmentsNotFound(account.name));
                return Ok(());
            }
            let tz = Config::read()?.attendance().offset()?;
            View::adjustments(&list, &tz)?;
        }
        AdjustCommand::Delete { id } => {
            adjustments.delete(id)?;
            msg_success!(Message::AdjustmentDeleted(id));
        }
    }

    Ok(())
}
