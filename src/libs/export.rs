//! Export of performance and attendance data to CSV or JSON files.
//!
//! ```rust,no_run
//! use clockin::libs::export::{ExportFormat, Exporter};
//!
//! let exporter = Exporter::new(ExportFormat::Csv, None);
//! exporter.export_performance(&[])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::performance::PerformanceStat;
use super::workflow::AttendanceSummary;
use anyhow::Result;
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values, one row per person.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

const PERFORMANCE_HEADER: [&str; 10] = [
    "Account ID",
    "School ID",
    "Name",
    "Job",
    "Online",
    "Total Hours",
    "Avg Daily Hours",
    "Avg Weekly Hours",
    "Adjustment Hours",
    "Profile Picture",
];

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Without an explicit path the file is named after the current time,
    /// e.g. `clockin_export_20240304_173000.csv`.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let default_name = format!("clockin_export_{}", Local::now().format("%Y%m%d_%H%M%S"));
        let output_path = output_path.unwrap_or_else(|| PathBuf::from(format!("{}.{}", default_name, format.extension())));

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export_performance(&self, stats: &[PerformanceStat]) -> Result<()> {
        match self.format {
            ExportFormat::Csv => write_performance_csv(File::create(&self.output_path)?, stats),
            ExportFormat::Json => self.write_json(stats),
        }
    }

    pub fn export_summary(&self, summaries: &[AttendanceSummary]) -> Result<()> {
        match self.format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&self.output_path)?;
                wtr.write_record(["Account ID", "Name", "Sessions", "Completed Minutes"])?;
                for summary in summaries {
                    wtr.write_record([
                        summary.account_id.clone(),
                        summary.name.clone(),
                        summary.sessions.to_string(),
                        summary.completed_minutes.to_string(),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
            ExportFormat::Json => self.write_json(summaries),
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Writes performance rows as CSV; hours keep two decimals.
pub fn write_performance_csv<W: Write>(writer: W, stats: &[PerformanceStat]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PERFORMANCE_HEADER)?;

    for stat in stats {
        wtr.write_record([
            stat.account_id.clone(),
            stat.school_id.clone(),
            stat.name.clone(),
            stat.job_name.clone().unwrap_or_default(),
            stat.is_online.to_string(),
            format!("{:.2}", stat.total_rendered_hours),
            format!("{:.2}", stat.avg_daily_hours),
            format!("{:.2}", stat.avg_weekly_hours),
            format!("{:.2}", stat.adjustment_hours),
            stat.profile_picture.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
