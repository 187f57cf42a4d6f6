//! Performance table, optionally exported.

use crate::{
    db::{accounts::Accounts, activities::Activities, adjustments::Adjustments},
    libs::{
        config::Config,
        export::{ExportFormat, Exporter},
        messages::Message,
        performance::{aggregate_all, OnlineFilter, PerformanceFilter},
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PerfArgs {
    /// Show everyone, or only people who are online / offline
    #[arg(long, value_enum, default_value_t = OnlineFilter::All)]
    status: OnlineFilter,

    /// Case-insensitive match on name or school id
    #[arg(long, short)]
    search: Option<String>,

    /// Only people assigned to this job
    #[arg(long)]
    job_id: Option<i64>,

    /// Write the table to a file in this format
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// Output file for --export
    #[arg(long, short, requires = "export")]
    output: Option<PathBuf>,
}

pub fn cmd(args: PerfArgs) -> Result<()> {
    let now = Config::read()?.attendance().now()?;

    let accounts = Accounts::new()?.fetch_all()?;
    let records = Activities::new()?.fetch_all()?;
    let adjustments = Adjustments::new()?.totals_by_account()?;

    let filter = PerformanceFilter {
        status: args.status,
        search: args.search,
        job_id: args.job_id,
    };
    let stats = aggregate_all(&accounts, &records, &adjustments, &now, &filter);

    if let Some(format) = args.export {
        let exporter = Exporter::new(format, args.output);
        exporter.export_performance(&stats)?;
        msg_success!(Message::ExportCompleted(exporter.output_path().display().to_string()));
        return Ok(());
    }

    if stats.is_empty() {
        msg_info!(Message::PerformanceEmpty);
        return Ok(());
    }

    msg_print!(Message::PerformanceHeader(filter.status.to_string()), true);
    View::performance(&stats)?;

    Ok(())
}
