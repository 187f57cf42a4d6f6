use super::{local_range, parse_date};
use crate::{
    db::activities::{Activities, ActivityFilter},
    libs::{
        config::Config,
        export::{ExportFormat, Exporter},
        messages::Message,
        view::View,
        workflow::summarize,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// First local date (YYYY-MM-DD or 'today')
    #[arg(long, default_value = "today")]
    from: String,

    /// Last local date (YYYY-MM-DD or 'today')
    #[arg(long, default_value = "today")]
    to: String,

    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    #[arg(long, short, requires = "export")]
    output: Option<PathBuf>,
}

pub fn cmd(args: SummaryArgs) -> Result<()> {
    let settings = Config::read()?.attendance();
    let now = settings.now()?;
    let from = parse_date(&args.from, &now)?;
    let to = parse_date(&args.to, &now)?;
    let (start, end) = local_range(from, to, &settings.offset()?)?;

    let records = Activities::new()?.fetch(&ActivityFilter {
        account_id: None,
        from: Some(start),
        to: Some(end),
    })?;
    // Open sessions from before the range are listed too; they do not count here.
    let in_range: Vec<_> = records
        .into_iter()
        .filter(|r| r.time_in >= start && r.time_in <= end)
        .collect();
    let summaries = summarize(&in_range);

    if let Some(format) = args.export {
        let exporter = Exporter::new(format, args.output);
        exporter.export_summary(&summaries)?;
        msg_success!(Message::ExportCompleted(exporter.output_path().display().to_string()));
        return Ok(());
    }

    if summaries.is_empty() {
        msg_info!(Message::SummaryEmpty);
        return Ok(());
    }

    msg_print!(Message::SummaryHeader(from.to_string(), to.to_string()), true);
    View::summary(&summaries)?;

    Ok(())
}
