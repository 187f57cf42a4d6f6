use crate::{
    db::accounts::Accounts,
    libs::{account::Account, activity::JobReference, messages::Message, view::View},
    msg_bail_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Debug, Subcommand)]
enum AccountCommand {
    /// Add a person to the roster
    Add {
        /// Account id
        #[arg(long)]
        id: String,
        /// School id typed at the kiosk
        #[arg(long)]
        school_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        job_id: Option<i64>,
        #[arg(long, requires = "job_id")]
        job_name: Option<String>,
        /// Profile picture URL
        #[arg(long)]
        picture: Option<String>,
    },
    /// List the roster
    List,
    /// Assign a job, or clear it with --clear
    Job {
        /// Account id or school id
        account: String,
        #[arg(long, conflicts_with = "clear")]
        job_id: Option<i64>,
        #[arg(long, conflicts_with = "clear")]
        job_name: Option<String>,
        #[arg(long)]
        clear: bool,
    },
}

fn job_from(job_id: Option<i64>, job_name: Option<String>) -> Result<Option<JobReference>> {
    match (job_id, job_name) {
        (Some(id), Some(name)) => Ok(Some(JobReference { id, name })),
        (Some(_), None) => msg_bail_anyhow!(Message::JobNameRequired),
        (None, _) => Ok(None),
    }
}

pub fn cmd(args: AccountArgs) -> Result<()> {
    let accounts = Accounts::new()?;

    match args.command {
        AccountCommand::Add {
            id,
            school_id,
            name,
            job_id,
            job_name,
            picture,
        } => {
            let mut account = Account::new(&id, &school_id, &name);
            account.job = job_from(job_id, job_name)?;
            account.profile_picture = picture;
            accounts.insert(&account)?;
            msg_success!(Message::AccountCreated(account.name));
        }
        AccountCommand::List => {
            let all = accounts.fetch_all()?;
            if all.is_empty() {
                msg_info!(Message::AccountsNotFound);
                return Ok(());
            }
            View::accounts(&all)?;
        }
        AccountCommand::Job {
            account,
            job_id,
            job_name,
            clear,
        } => {
            let account = accounts.find(&account)?;
            let job = if clear { None } else { job_from(job_id, job_name)? };
            let updated = accounts.assign_job(&account.id, job.as_ref())?;
            match updated.job {
                Some(job) => msg_success!(Message::JobAssigned(updated.name, job.name)),
                None => msg_success!(Message::JobCleared(updated.name)),
            }
        }
    }

    Ok(())
}
