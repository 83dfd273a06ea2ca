use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use serde_json::json;
use uuid::Uuid;

use crate::constants::{REPORT_TEXT_NAME, SUMMARY_JSON_NAME};
use crate::models::{PluginOutcome, PluginStatus};
use crate::report::{ReportAssembler, RunReport};

/// Writes `run_summary.json` and `Report.txt` into the report folder.
#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryReport;

impl ReportAssembler for SummaryReport {
    fn generate_report(&self, report: &RunReport) -> Result<()> {
        let json_path = report.report_folder_base.join(SUMMARY_JSON_NAME);
        fs::write(&json_path, create_run_summary(report)?)
            .context(format!("Failed to write {}", json_path.display()))?;

        let text_path = report.report_folder_base.join(REPORT_TEXT_NAME);
        fs::write(&text_path, render_text_report(report))
            .context(format!("Failed to write {}", text_path.display()))?;

        info!("Report written to {}", report.report_folder_base.display());
        Ok(())
    }
}

/// Create a JSON summary of the run.
///
/// The summary carries a unique report id, the analysis host, the timing,
/// the container that was processed, the examiner's case data, and one
/// entry per dispatched plugin.
///
/// # Example Output
///
/// ```json
/// {
///   "report_id": "550e8400-e29b-41d4-a716-446655440000",
///   "tool_version": "0.1.0",
///   "analysis_host": "lab-ws-03",
///   "container": {"type": "zip", "path": "/cases/sd.zip"},
///   "elapsed": {"seconds": 4.2, "hms": "00:00:04"},
///   "processed_file_count": 2,
///   "plugins": [...]
/// }
/// ```
pub fn create_run_summary(report: &RunReport) -> Result<String> {
    let analysis_host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let summary = json!({
        "report_id": Uuid::new_v4().to_string(),
        "tool_version": env!("CARGO_PKG_VERSION"),
        "analysis_host": analysis_host,
        "os": std::env::consts::OS,
        "generated": Local::now().to_rfc3339(),
        "container": {
            "type": report.kind,
            "path": report.input_path,
        },
        "elapsed": {
            "seconds": report.elapsed_secs,
            "hms": report.elapsed_hms,
            "cpu_seconds": report.cpu_secs,
        },
        "case_data": report.case_data,
        "processed_file_count": report.processed_file_count(),
        "failed_plugin_count": report.failed_count(),
        "plugins": report.outcomes,
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize run summary to JSON")
}

fn render_text_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "DLEAPP Report");
    let _ = writeln!(out, "=============");
    let _ = writeln!(out, "Extraction type: {}", report.kind);
    let _ = writeln!(out, "Input: {}", report.input_path);
    let _ = writeln!(
        out,
        "Processing time: {} ({:.2} seconds)",
        report.elapsed_hms, report.elapsed_secs
    );
    if let Some(cpu) = report.cpu_secs {
        let _ = writeln!(out, "Processor time: {:.2} seconds", cpu);
    }
    for (key, value) in &report.case_data.0 {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    let _ = writeln!(out, "Processed files: {}", report.processed_file_count());

    let mut by_category: BTreeMap<&str, Vec<&PluginOutcome>> = BTreeMap::new();
    for outcome in &report.outcomes {
        if outcome.status != PluginStatus::NoMatch {
            by_category.entry(outcome.category.as_str()).or_default().push(outcome);
        }
    }

    for (category, outcomes) in by_category {
        let _ = writeln!(out, "\n{}", category);
        for outcome in outcomes {
            let status = match &outcome.status {
                PluginStatus::Completed => "completed".to_string(),
                PluginStatus::Failed(detail) => format!("failed: {}", detail),
                PluginStatus::NoMatch => "no match".to_string(),
            };
            let _ = writeln!(
                out,
                "  {} [{}] - {} file(s), {}",
                outcome.name,
                outcome.module_name,
                outcome.files.len(),
                status
            );
            for file in &outcome.files {
                let _ = writeln!(out, "    {}", file);
            }
        }
    }

    let skipped: Vec<&str> = report
        .outcomes
        .iter()
        .filter(|o| o.status == PluginStatus::NoMatch)
        .map(|o| o.name.as_str())
        .collect();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nNo files found for: {}", skipped.join(", "));
    }
    out
}
