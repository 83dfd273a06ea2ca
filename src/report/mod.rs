//! Hand-off to report generation.
//!
//! After dispatch the run is summarized in a [`RunReport`] and passed once to
//! a [`ReportAssembler`]. The bundled [`SummaryReport`] writes a JSON summary
//! and a plain-text report next to the category folders.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::models::{CaseData, PluginOutcome, PluginStatus};
use crate::seeker::ContainerKind;

mod summary;

pub use summary::SummaryReport;

/// Everything known about a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Report folder with any long-path marker removed
    pub report_folder_base: PathBuf,
    pub elapsed_secs: f64,
    /// Processor time of the run, where the platform reports it
    pub cpu_secs: Option<f64>,
    /// Elapsed time as `HH:MM:SS`
    pub elapsed_hms: String,
    pub kind: ContainerKind,
    /// Input path with any long-path marker removed
    pub input_path: String,
    pub case_data: CaseData,
    pub outcomes: Vec<PluginOutcome>,
}

impl RunReport {
    /// Number of distinct files handed to parsers that completed.
    pub fn processed_file_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == PluginStatus::Completed)
            .flat_map(|o| o.files.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

/// Turns a finished run into report files. Called once per run.
pub trait ReportAssembler {
    fn generate_report(&self, report: &RunReport) -> Result<()>;
}

/// Format a duration as `HH:MM:SS`, hours not capped at 24.
pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
