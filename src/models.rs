use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Case metadata supplied by the examiner (case number, agency, examiner...).
///
/// Passed unchanged from the command line to the report.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct CaseData(pub BTreeMap<String, String>);

impl CaseData {
    /// Load case data from a JSON object of string fields.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read case data file: {}", path.display()))?;
        let case_data: CaseData = serde_json::from_str(&content)
            .context(format!("Case data file is not a JSON object of strings: {}", path.display()))?;
        Ok(case_data)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What happened to one plugin during a dispatch pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PluginStatus {
    /// None of the plugin's patterns matched; the parser was not invoked.
    NoMatch,
    /// The parser ran to completion.
    Completed,
    /// Searching, preparing the output folder, or parsing failed.
    Failed(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PluginOutcome {
    pub name: String,
    pub module_name: String,
    pub category: String,
    /// Matched files handed to the parser, long-path marker removed.
    pub files: Vec<String>,
    #[serde(flatten)]
    pub status: PluginStatus,
}

impl PluginOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, PluginStatus::Failed(_))
    }
}
