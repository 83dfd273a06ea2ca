use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{info, warn};

use crate::constants::{
    AUDIT_LOG_NAME, REPORT_FOLDER_PREFIX, REPORT_TIMESTAMP_FORMAT, RUN_LOG_NAME, SCRIPT_LOGS_DIR,
    TEMP_DIR,
};

/// Folders of one run, all under a fresh `DLEAPP_Reports_<timestamp>` folder.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub report_folder_base: PathBuf,
    pub script_logs: PathBuf,
    pub temp_folder: PathBuf,
    run_log: RunLog,
}

type RunLog = Arc<Mutex<Option<File>>>;

/// Writer for the run log inside the report folder.
///
/// Shares the file with its [`OutputLayout`]. Once the layout closes the
/// log, writes are accepted and dropped, so a logger holding this writer
/// never keeps the report folder alive or recreates it.
#[derive(Debug, Clone)]
pub struct RunLogWriter {
    file: RunLog,
}

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl OutputLayout {
    /// Create the layout under `output_dir` using the current local time.
    pub fn create(output_dir: &Path) -> Result<Self> {
        Self::create_at(output_dir, Local::now())
    }

    /// Create the layout for a given start time.
    ///
    /// If a report folder with the same timestamp already exists a numeric
    /// suffix is added, so a previous run is never written into.
    pub fn create_at(output_dir: &Path, started: DateTime<Local>) -> Result<Self> {
        let name = format!(
            "{}{}",
            REPORT_FOLDER_PREFIX,
            started.format(REPORT_TIMESTAMP_FORMAT)
        );
        let mut report_folder_base = output_dir.join(&name);
        let mut counter = 1;
        while report_folder_base.exists() {
            report_folder_base = output_dir.join(format!("{}_{}", name, counter));
            counter += 1;
        }

        let script_logs = report_folder_base.join(SCRIPT_LOGS_DIR);
        let temp_folder = report_folder_base.join(TEMP_DIR);
        fs::create_dir_all(&script_logs).context(format!(
            "Failed to create report folder {}",
            report_folder_base.display()
        ))?;
        fs::create_dir_all(&temp_folder).context("Failed to create temp folder")?;

        info!("Report folder created at {}", report_folder_base.display());
        Ok(OutputLayout {
            report_folder_base,
            script_logs,
            temp_folder,
            run_log: RunLog::default(),
        })
    }

    /// Create the run log file and return a writer for it.
    pub fn open_run_log(&self) -> Result<RunLogWriter> {
        let path = self.run_log_path();
        let file = File::create(&path)
            .context(format!("Failed to create run log {}", path.display()))?;
        *self.run_log.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
        Ok(RunLogWriter {
            file: Arc::clone(&self.run_log),
        })
    }

    /// Close the run log. Later writes through any [`RunLogWriter`] are dropped.
    pub fn close_run_log(&self) {
        let file = self
            .run_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut file) = file {
            let _ = file.flush();
        }
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.script_logs.join(AUDIT_LOG_NAME)
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.script_logs.join(RUN_LOG_NAME)
    }

    /// Remove the whole report folder after a run that never started.
    ///
    /// The run log is closed first; Windows refuses to delete open files.
    pub fn discard(&self) {
        self.close_run_log();
        if let Err(e) = fs::remove_dir_all(&self.report_folder_base) {
            warn!(
                "Failed to remove report folder {}: {}",
                self.report_folder_base.display(),
                e
            );
        }
    }

    /// Remove the scratch folder. Failure only warns; the report is already complete.
    pub fn cleanup_temp(&self) {
        if !self.temp_folder.exists() {
            return;
        }
        match fs::remove_dir_all(&self.temp_folder) {
            Ok(()) => info!("Removed temp folder {}", self.temp_folder.display()),
            Err(e) => warn!(
                "Failed to remove temp folder {}: {}",
                self.temp_folder.display(),
                e
            ),
        }
    }
}
