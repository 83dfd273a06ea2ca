//! Reference parse routines that plugin definitions can bind to.
//!
//! Each routine writes one tab-separated table into the category folder it
//! is given. Real artifact decoders plug in through the same
//! [`ArtifactParser`] trait.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_HASH_SIZE_MB;
use crate::plugins::ArtifactParser;
use crate::seeker::FileSeeker;
use crate::utils::hash::calculate_sha256;
use crate::utils::long_path::display_path;

/// Built-in routine a plugin definition refers to by name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// File listing with size, modification time and SHA-256
    Inventory,
    /// Row count of delimited text logs
    CsvRows,
}

impl ParserKind {
    /// Instantiate the routine; `output_name` names the table it writes.
    pub fn build(self, output_name: &str) -> Arc<dyn ArtifactParser> {
        match self {
            ParserKind::Inventory => Arc::new(InventoryParser::new(output_name)),
            ParserKind::CsvRows => Arc::new(CsvRowsParser::new(output_name)),
        }
    }
}

/// Tab-separated table writer.
pub struct TsvWriter {
    writer: BufWriter<File>,
    wrap_text: bool,
}

impl TsvWriter {
    pub fn create(path: &Path, headers: &[&str], wrap_text: bool) -> Result<Self> {
        let file =
            File::create(path).context(format!("Failed to create {}", path.display()))?;
        let mut tsv = TsvWriter {
            writer: BufWriter::new(file),
            wrap_text,
        };
        tsv.write_row(headers)?;
        Ok(tsv)
    }

    pub fn write_row<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        let line: Vec<String> = cells
            .iter()
            .map(|c| tsv_cell(c.as_ref(), self.wrap_text))
            .collect();
        writeln!(self.writer, "{}", line.join("\t"))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Render one cell.
///
/// Tabs never survive. Line breaks are kept inside a quoted cell when text
/// wrapping is on, and flattened to spaces when it is off.
pub fn tsv_cell(value: &str, wrap_text: bool) -> String {
    let value = value.replace('\t', " ");
    if !value.contains('\n') && !value.contains('\r') {
        return value;
    }
    if wrap_text {
        format!("\"{}\"", value.replace('\r', "").replace('"', "\"\""))
    } else {
        value
            .split(|c: char| c == '\n' || c == '\r')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lists matched files with size, modification time and SHA-256.
pub struct InventoryParser {
    output_name: String,
}

impl InventoryParser {
    pub fn new(output_name: &str) -> Self {
        InventoryParser {
            output_name: output_name.to_string(),
        }
    }
}

impl ArtifactParser for InventoryParser {
    fn parse(
        &self,
        files: &[PathBuf],
        report_folder: &Path,
        _seeker: &dyn FileSeeker,
        wrap_text: bool,
    ) -> Result<()> {
        let out = report_folder.join(format!("{}.tsv", self.output_name));
        let mut tsv = TsvWriter::create(&out, &["file", "size", "modified", "sha256"], wrap_text)?;

        for file in files {
            let metadata = fs::metadata(file)
                .context(format!("Failed to stat {}", display_path(file)))?;
            let modified = metadata
                .modified()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
                .unwrap_or_default();
            let hash = match calculate_sha256(file, MAX_HASH_SIZE_MB) {
                Ok(Some(hash)) => hash,
                Ok(None) => String::new(),
                Err(e) => {
                    warn!("Failed to hash {}: {}", display_path(file), e);
                    String::new()
                }
            };
            tsv.write_row(&[
                display_path(file),
                metadata.len().to_string(),
                modified,
                hash,
            ])?;
        }

        tsv.finish()?;
        debug!("Wrote {} inventory rows to {}", files.len(), out.display());
        Ok(())
    }
}

/// Counts the data rows of delimited text logs (flight CSV exports and the like).
pub struct CsvRowsParser {
    output_name: String,
}

impl CsvRowsParser {
    pub fn new(output_name: &str) -> Self {
        CsvRowsParser {
            output_name: output_name.to_string(),
        }
    }
}

impl ArtifactParser for CsvRowsParser {
    fn parse(
        &self,
        files: &[PathBuf],
        report_folder: &Path,
        _seeker: &dyn FileSeeker,
        wrap_text: bool,
    ) -> Result<()> {
        let out = report_folder.join(format!("{}.tsv", self.output_name));
        let mut tsv = TsvWriter::create(&out, &["file", "rows", "columns", "header"], wrap_text)?;

        for file in files {
            let bytes =
                fs::read(file).context(format!("Failed to read {}", display_path(file)))?;
            let text = String::from_utf8_lossy(&bytes);
            let records = split_records(&text);
            let header = records.first().copied().unwrap_or("");
            let columns = if header.is_empty() {
                0
            } else {
                count_fields(header)
            };
            let rows = records.len().saturating_sub(1);
            tsv.write_row(&[
                display_path(file),
                rows.to_string(),
                columns.to_string(),
                header.to_string(),
            ])?;
        }

        tsv.finish()
    }
}

/// Split delimited text into records, honoring double-quoted fields that
/// span lines. Blank records are dropped.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '\n' if !in_quotes => {
                records.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        records.push(&text[start..]);
    }
    records
        .into_iter()
        .map(|r| r.trim_end_matches('\r'))
        .filter(|r| !r.trim().is_empty())
        .collect()
}

/// Number of comma-separated fields in one record, ignoring commas in quotes.
fn count_fields(record: &str) -> usize {
    let mut in_quotes = false;
    let mut fields = 1;
    for ch in record.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields += 1,
            _ => {}
        }
    }
    fields
}
