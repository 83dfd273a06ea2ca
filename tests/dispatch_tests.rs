//! Dispatcher behaviour seen from outside the crate: one failing plugin
//! must not cost the others their output.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tempfile::TempDir;

use rust_dleapp::dispatch::{crunch_artifacts, AuditLog, DispatchOptions, ProgressSink};
use rust_dleapp::models::PluginStatus;
use rust_dleapp::plugins::{ArtifactParser, PluginDescriptor};
use rust_dleapp::seeker::{DirSeeker, FileSeeker};

/// Progress sink that remembers every value it was given.
#[derive(Default)]
struct RecordingProgress {
    total: Mutex<Option<usize>>,
    values: Mutex<Vec<usize>>,
}

impl ProgressSink for RecordingProgress {
    fn set_total(&self, total: usize) {
        *self.total.lock().unwrap() = Some(total);
    }

    fn set_progress(&self, value: usize) {
        self.values.lock().unwrap().push(value);
    }
}

fn writes_marker(name: &'static str) -> Arc<dyn ArtifactParser> {
    Arc::new(
        move |files: &[PathBuf], folder: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
            fs::write(folder.join(format!("{}.txt", name)), files.len().to_string())?;
            Ok(())
        },
    )
}

fn fails() -> Arc<dyn ArtifactParser> {
    Arc::new(|_: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
        bail!("unexpected record layout")
    })
}

fn image() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("logs"))?;
    fs::create_dir_all(dir.path().join("DJI"))?;
    fs::write(dir.path().join("logs/flight1.csv"), "time,alt\n0,0\n")?;
    fs::write(dir.path().join("DJI/FLY001.DAT"), "dat")?;
    Ok(dir)
}

#[test]
fn test_failure_isolated_between_plugins() -> Result<()> {
    let image = image()?;
    let report = TempDir::new()?;
    let audit = AuditLog::create(&report.path().join("ProcessedFilesLog.txt"))?;
    let progress = RecordingProgress::default();
    let seeker: Arc<dyn FileSeeker> = Arc::new(DirSeeker::new(image.path())?);

    let plugins = vec![
        PluginDescriptor::new("First", "Logs", "first", vec!["logs/*.csv".into()], writes_marker("first")),
        PluginDescriptor::new("Second", "Broken", "second", vec!["logs/*.csv".into()], fails()),
        PluginDescriptor::new("Third", "Aircraft", "third", vec!["**/*.dat".into()], writes_marker("third")),
    ];

    let summary = crunch_artifacts(
        &plugins,
        seeker,
        report.path(),
        &audit,
        &progress,
        DispatchOptions::default(),
    )?;

    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.outcomes[0].status, PluginStatus::Completed);
    assert!(summary.outcomes[1].is_failure());
    assert_eq!(summary.outcomes[2].status, PluginStatus::Completed);

    assert_eq!(fs::read_to_string(report.path().join("Logs/first.txt"))?, "1");
    assert_eq!(fs::read_to_string(report.path().join("Aircraft/third.txt"))?, "1");

    let log = fs::read_to_string(audit.path())?;
    assert!(log.contains("Second [second]"));
    assert!(log.contains("Failed: unexpected record layout"));

    assert_eq!(*progress.total.lock().unwrap(), Some(3));
    assert_eq!(*progress.values.lock().unwrap(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_plugin_without_matches_is_skipped() -> Result<()> {
    let image = image()?;
    let report = TempDir::new()?;
    let audit = AuditLog::create(&report.path().join("ProcessedFilesLog.txt"))?;
    let seeker: Arc<dyn FileSeeker> = Arc::new(DirSeeker::new(image.path())?);

    let invoked = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&invoked);
    let parser: Arc<dyn ArtifactParser> =
        Arc::new(move |_: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
            *flag.lock().unwrap() = true;
            Ok(())
        });
    let plugins = vec![PluginDescriptor::new(
        "Parrot Flight Logs",
        "Parrot",
        "parrot",
        vec!["**/FreeFlight*/**/*.json".into(), "**/academy/*.pud".into()],
        parser,
    )];

    let summary = crunch_artifacts(
        &plugins,
        seeker,
        report.path(),
        &audit,
        &RecordingProgress::default(),
        DispatchOptions::default(),
    )?;

    assert_eq!(summary.outcomes[0].status, PluginStatus::NoMatch);
    assert!(summary.outcomes[0].files.is_empty());
    assert!(!*invoked.lock().unwrap());
    assert!(!report.path().join("Parrot").exists());

    let log = fs::read_to_string(audit.path())?;
    assert!(log.contains("No file found for regex **/FreeFlight*/**/*.json"));
    assert!(log.contains("No file found for regex **/academy/*.pud"));
    Ok(())
}

#[test]
fn test_empty_selection() -> Result<()> {
    let image = image()?;
    let report = TempDir::new()?;
    let audit = AuditLog::create(&report.path().join("ProcessedFilesLog.txt"))?;
    let progress = RecordingProgress::default();
    let seeker: Arc<dyn FileSeeker> = Arc::new(DirSeeker::new(image.path())?);

    let summary = crunch_artifacts(&[], seeker, report.path(), &audit, &progress, DispatchOptions::default())?;

    assert!(summary.outcomes.is_empty());
    assert_eq!(*progress.total.lock().unwrap(), Some(0));
    assert!(progress.values.lock().unwrap().is_empty());
    Ok(())
}
