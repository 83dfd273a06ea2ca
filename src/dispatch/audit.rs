use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;

/// Append-only record of what each plugin searched for and what was found.
///
/// Written to `Script Logs/ProcessedFilesLog.txt`. Writes are serialized so
/// the log stays readable if plugins are ever dispatched concurrently.
pub struct AuditLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl AuditLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .context(format!("Failed to create audit log {}", path.display()))?;
        let log = AuditLog {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        };
        log.write(&format!(
            "Processed files log, started {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_input(&self, input: &str) -> Result<()> {
        self.write(&format!("Extraction/Path selected: {}\n", input))
    }

    pub fn plugin_started(&self, name: &str, module_name: &str) -> Result<()> {
        self.write(&format!("\n{} [{}]\n", name, module_name))
    }

    /// Record the result of one pattern. `found` must already be display paths.
    pub fn record_search(&self, pattern: &str, found: &[String]) -> Result<()> {
        if found.is_empty() {
            return self.write(&format!("  No file found for regex {}\n", pattern));
        }
        let mut entry = format!(
            "  {} {} for regex {} located at:\n",
            found.len(),
            if found.len() == 1 { "file" } else { "files" },
            pattern
        );
        for path in found {
            entry.push_str("    ");
            entry.push_str(path);
            entry.push('\n');
        }
        self.write(&entry)
    }

    /// Record a pattern whose search itself failed.
    pub fn record_search_error(&self, pattern: &str, detail: &str) -> Result<()> {
        self.write(&format!("  Search failed for regex {}: {}\n", pattern, detail))
    }

    pub fn record_failure(&self, detail: &str) -> Result<()> {
        self.write(&format!("  Failed: {}\n", detail))
    }

    /// Flush buffered entries to disk.
    pub fn close(&self) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .flush()
            .context(format!("Failed to flush audit log {}", self.path.display()))
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(text.as_bytes())
            .context(format!("Failed to write audit log {}", self.path.display()))
    }
}
