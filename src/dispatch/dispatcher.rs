use std::any::Any;
use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::task::{JoinError, JoinHandle};

use crate::dispatch::audit::AuditLog;
use crate::dispatch::progress::ProgressSink;
use crate::models::{PluginOutcome, PluginStatus};
use crate::plugins::PluginDescriptor;
use crate::security::sanitize_filename;
use crate::seeker::FileSeeker;
use crate::utils::long_path::display_path;

/// Knobs that apply to every plugin of a run.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Passed through to every parser
    pub wrap_text: bool,
    /// Parsers running longer than this are reported as failed
    pub plugin_timeout: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        DispatchOptions {
            wrap_text: true,
            plugin_timeout: None,
        }
    }
}

/// Result of a dispatch pass.
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    /// One entry per selected plugin, in dispatch order
    pub outcomes: Vec<PluginOutcome>,
    pub elapsed: Duration,
}

/// Runs the selected plugins against one container.
///
/// Plugins are processed one after the other. Each parser runs on a blocking
/// task so that an error, a panic or an overrun only fails that plugin.
///
/// A blocking task cannot be cancelled. A parser that overruns its timeout is
/// recorded as failed and left running, but no later plugin is handed the
/// same category folder until it has returned, and [`Dispatcher::run`] waits
/// for every such parser before it returns.
pub struct Dispatcher<'a> {
    seeker: Arc<dyn FileSeeker>,
    report_folder_base: PathBuf,
    audit: &'a AuditLog,
    progress: &'a dyn ProgressSink,
    options: DispatchOptions,
    processed: AtomicUsize,
    overrunning: Mutex<Vec<Overrun>>,
    late_notes: Mutex<Vec<(usize, String)>>,
}

/// A parser that exceeded its timeout and is still running.
struct Overrun {
    index: usize,
    name: String,
    folder: PathBuf,
    since: Instant,
    handle: JoinHandle<Result<()>>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        seeker: Arc<dyn FileSeeker>,
        report_folder_base: &Path,
        audit: &'a AuditLog,
        progress: &'a dyn ProgressSink,
        options: DispatchOptions,
    ) -> Self {
        Dispatcher {
            seeker,
            report_folder_base: report_folder_base.to_path_buf(),
            audit,
            progress,
            options,
            processed: AtomicUsize::new(0),
            overrunning: Mutex::new(Vec::new()),
            late_notes: Mutex::new(Vec::new()),
        }
    }

    pub async fn run(&self, plugins: &[PluginDescriptor]) -> Vec<PluginOutcome> {
        self.progress.set_total(plugins.len());
        let mut outcomes = Vec::with_capacity(plugins.len());

        for (index, plugin) in plugins.iter().enumerate() {
            let outcome = self.dispatch_one(index, plugin).await;
            if let PluginStatus::Failed(detail) = &outcome.status {
                if let Err(e) = self.audit.record_failure(detail) {
                    warn!("{:#}", e);
                }
            }
            outcomes.push(outcome);

            let done = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
            self.progress.set_progress(done);
        }

        self.settle_overruns(None).await;
        let notes = std::mem::take(
            &mut *self
                .late_notes
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for (index, note) in notes {
            if let Some(PluginStatus::Failed(detail)) =
                outcomes.get_mut(index).map(|o| &mut o.status)
            {
                detail.push_str("; ");
                detail.push_str(&note);
            }
        }

        outcomes
    }

    async fn dispatch_one(&self, index: usize, plugin: &PluginDescriptor) -> PluginOutcome {
        if let Err(e) = self.audit.plugin_started(&plugin.name, &plugin.module_name) {
            warn!("{:#}", e);
        }

        let outcome = |files: &[PathBuf], status: PluginStatus| PluginOutcome {
            name: plugin.name.clone(),
            module_name: plugin.module_name.clone(),
            category: plugin.category.clone(),
            files: files.iter().map(|f| display_path(f)).collect(),
            status,
        };

        let files = match self.resolve(plugin) {
            Ok(files) => files,
            Err(e) => {
                error!("{} [{}] search failed: {:?}", plugin.name, plugin.module_name, e);
                return outcome(&[], PluginStatus::Failed(format!("{:#}", e)));
            }
        };
        if files.is_empty() {
            info!("No files found for {} [{}]", plugin.name, plugin.module_name);
            return outcome(&files, PluginStatus::NoMatch);
        }

        let category_folder = self
            .report_folder_base
            .join(sanitize_filename(&plugin.category));
        self.settle_overruns(Some(&category_folder)).await;
        if let Err(e) = fs::create_dir_all(&category_folder) {
            error!(
                "Error creating {} report directory at path {}: {}",
                plugin.name,
                category_folder.display(),
                e
            );
            return outcome(
                &files,
                PluginStatus::Failed(format!(
                    "cannot create report folder {}: {}",
                    category_folder.display(),
                    e
                )),
            );
        }

        info!("{} [{}] artifact started", plugin.name, plugin.module_name);
        let status = self.invoke(index, plugin, &files, &category_folder).await;
        match &status {
            PluginStatus::Failed(detail) => error!(
                "Reading {} artifact had errors! {}",
                plugin.name, detail
            ),
            _ => info!("{} [{}] artifact completed", plugin.name, plugin.module_name),
        }
        outcome(&files, status)
    }

    /// Search every pattern of `plugin` in order, auditing each one.
    ///
    /// A path found by more than one pattern is kept once, at its first
    /// position. A failing pattern does not stop the remaining ones from being
    /// searched and audited; the first failure is returned afterwards.
    fn resolve(&self, plugin: &PluginDescriptor) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();
        let mut first_error = None;
        for pattern in &plugin.search {
            let found = match self.seeker.search(pattern) {
                Ok(found) => found,
                Err(e) => {
                    let e = anyhow::Error::new(e)
                        .context(format!("Search for {} failed", pattern));
                    if let Err(audit_err) =
                        self.audit.record_search_error(pattern, &format!("{:#}", e))
                    {
                        warn!("{:#}", audit_err);
                    }
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            let shown: Vec<String> = found.iter().map(|f| display_path(f)).collect();
            if let Err(e) = self.audit.record_search(pattern, &shown) {
                warn!("{:#}", e);
            }
            for path in found {
                if seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(files),
        }
    }

    async fn invoke(
        &self,
        index: usize,
        plugin: &PluginDescriptor,
        files: &[PathBuf],
        category_folder: &Path,
    ) -> PluginStatus {
        let parser = Arc::clone(&plugin.parser);
        let seeker = Arc::clone(&self.seeker);
        let task_files = files.to_vec();
        let folder = category_folder.to_path_buf();
        let wrap_text = self.options.wrap_text;

        let mut task = tokio::task::spawn_blocking(move || {
            parser.parse(&task_files, &folder, &*seeker, wrap_text)
        });

        let joined = match self.options.plugin_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        "{} [{}] overran its {:?} timeout; {} is held until it returns",
                        plugin.name,
                        plugin.module_name,
                        limit,
                        category_folder.display()
                    );
                    self.overrunning
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(Overrun {
                            index,
                            name: plugin.name.clone(),
                            folder: category_folder.to_path_buf(),
                            since: Instant::now(),
                            handle: task,
                        });
                    return PluginStatus::Failed(format!("timed out after {:?}", limit));
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(())) => PluginStatus::Completed,
            Ok(Err(e)) => {
                error!(
                    "{} [{}] failure trace: {}",
                    plugin.name,
                    plugin.module_name,
                    failure_trace(&e)
                );
                PluginStatus::Failed(format!("{:#}", e))
            }
            Err(e) => PluginStatus::Failed(join_error_detail(e)),
        }
    }

    /// Wait for overrunning parsers that write into `folder`, or for all of
    /// them when `folder` is `None`.
    async fn settle_overruns(&self, folder: Option<&Path>) {
        let pending: Vec<Overrun> = {
            let mut overrunning = self
                .overrunning
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let (pending, rest): (Vec<Overrun>, Vec<Overrun>) = overrunning
                .drain(..)
                .partition(|o| folder.map_or(true, |f| o.folder == f));
            *overrunning = rest;
            pending
        };

        for overrun in pending {
            info!("Waiting for timed-out {} to return", overrun.name);
            let note = match overrun.handle.await {
                Ok(Ok(())) => format!("parser returned {:?} later", overrun.since.elapsed()),
                Ok(Err(e)) => format!("parser later failed: {:#}", e),
                Err(e) => format!("parser later {}", join_error_detail(e)),
            };
            info!("{}: {}", overrun.name, note);
            self.late_notes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((overrun.index, note));
        }
    }
}

/// Error chain plus any captured backtrace, for the run log.
fn failure_trace(e: &anyhow::Error) -> String {
    format!("{:?}", e)
}

fn join_error_detail(e: JoinError) -> String {
    if e.is_panic() {
        format!("panicked: {}", panic_message(e.into_panic()))
    } else {
        e.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Log every panic with its thread and a backtrace before the default hook runs.
fn install_panic_logger() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let thread = thread::current();
            error!(
                "Panic in thread {}: {}\n{}",
                thread.name().unwrap_or("<unnamed>"),
                info,
                Backtrace::force_capture()
            );
            previous(info);
        }));
    });
}

/// Synchronous entry point: dispatch `plugins` on a dedicated runtime.
///
/// The audit log is flushed before returning. Parsers that timed out have
/// returned by then, so nothing writes into the report folder afterwards.
pub fn crunch_artifacts(
    plugins: &[PluginDescriptor],
    seeker: Arc<dyn FileSeeker>,
    report_folder_base: &Path,
    audit: &AuditLog,
    progress: &dyn ProgressSink,
    options: DispatchOptions,
) -> Result<DispatchSummary> {
    install_panic_logger();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let started = Instant::now();
    let dispatcher = Dispatcher::new(seeker, report_folder_base, audit, progress, options);
    let outcomes = runtime.block_on(dispatcher.run(plugins));
    let elapsed = started.elapsed();
    drop(runtime);

    audit.close()?;
    Ok(DispatchSummary { outcomes, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::progress::MockProgressSink;
    use crate::plugins::ArtifactParser;
    use crate::seeker::DirSeeker;
    use crate::test_utils::create_test_image;
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use tempfile::TempDir;

    fn plugin(name: &str, category: &str, patterns: &[&str], parser: Arc<dyn ArtifactParser>) -> PluginDescriptor {
        PluginDescriptor::new(
            name,
            category,
            name.to_lowercase().replace(' ', "_"),
            patterns.iter().map(|p| p.to_string()).collect(),
            parser,
        )
    }

    fn recording(calls: Arc<Mutex<Vec<(String, usize)>>>, name: &str) -> Arc<dyn ArtifactParser> {
        let name = name.to_string();
        Arc::new(move |files: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
            calls.lock().unwrap().push((name.clone(), files.len()));
            Ok(())
        })
    }

    fn quiet_progress(count: usize) -> MockProgressSink {
        let mut progress = MockProgressSink::new();
        progress.expect_set_total().with(eq(count)).return_const(());
        progress.expect_set_progress().times(count).return_const(());
        progress
    }

    struct Fixture {
        _image: TempDir,
        report: TempDir,
        seeker: Arc<dyn FileSeeker>,
        audit: AuditLog,
    }

    fn fixture() -> Fixture {
        let image = create_test_image().unwrap();
        let report = TempDir::new().unwrap();
        let seeker: Arc<dyn FileSeeker> = Arc::new(DirSeeker::new(image.path()).unwrap());
        let audit = AuditLog::create(&report.path().join("ProcessedFilesLog.txt")).unwrap();
        Fixture {
            _image: image,
            report,
            seeker,
            audit,
        }
    }

    fn audit_text(fixture: &Fixture) -> String {
        fixture.audit.close().unwrap();
        fs::read_to_string(fixture.audit.path()).unwrap()
    }

    #[test]
    fn test_failing_plugin_is_isolated() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let failing: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                Err(anyhow!("corrupt header"))
            });
        let plugins = vec![
            plugin("First", "Logs", &["logs/*.csv"], recording(calls.clone(), "First")),
            plugin("Second", "Logs", &["logs/*.csv"], failing),
            plugin("Third", "Records", &["**/*.txt"], recording(calls.clone(), "Third")),
        ];

        let progress = quiet_progress(3);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("First".to_string(), 2), ("Third".to_string(), 1)]);
        assert_eq!(summary.outcomes[0].status, PluginStatus::Completed);
        assert_eq!(
            summary.outcomes[1].status,
            PluginStatus::Failed("corrupt header".to_string())
        );
        assert_eq!(summary.outcomes[2].status, PluginStatus::Completed);
        assert!(audit_text(&fx).contains("Failed: corrupt header"));
    }

    #[test]
    fn test_panicking_plugin_is_isolated() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let panicking: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                panic!("index out of range")
            });
        let plugins = vec![
            plugin("Panics", "Logs", &["logs/*.csv"], panicking),
            plugin("After", "Logs", &["logs/*.csv"], recording(calls.clone(), "After")),
        ];

        let progress = quiet_progress(2);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        match &summary.outcomes[0].status {
            PluginStatus::Failed(detail) => assert!(detail.contains("index out of range")),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_slow_plugin_times_out() {
        let fx = fixture();
        let slow: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], _: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                std::thread::sleep(Duration::from_millis(500));
                Ok(())
            });
        let plugins = vec![plugin("Slow", "Logs", &["logs/*.csv"], slow)];

        let progress = quiet_progress(1);
        let options = DispatchOptions {
            wrap_text: true,
            plugin_timeout: Some(Duration::from_millis(50)),
        };
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            options,
        )
        .unwrap();

        match &summary.outcomes[0].status {
            PluginStatus::Failed(detail) => {
                assert!(detail.starts_with("timed out after 50ms"), "{}", detail);
                assert!(detail.contains("parser returned"), "{}", detail);
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_timed_out_parser_cannot_overwrite_later_output() {
        let fx = fixture();
        let slow: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], folder: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                std::thread::sleep(Duration::from_millis(300));
                fs::write(folder.join("out.tsv"), "SLOW")?;
                Ok(())
            });
        let fast: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], folder: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                fs::write(folder.join("out.tsv"), "FAST")?;
                Ok(())
            });
        let plugins = vec![
            plugin("Slow", "Cat", &["logs/*.csv"], slow),
            plugin("Fast", "Cat", &["logs/*.csv"], fast),
        ];

        let progress = quiet_progress(2);
        let options = DispatchOptions {
            wrap_text: true,
            plugin_timeout: Some(Duration::from_millis(50)),
        };
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            options,
        )
        .unwrap();

        assert!(summary.outcomes[0].is_failure());
        assert_eq!(summary.outcomes[1].status, PluginStatus::Completed);
        let out = fx.report.path().join("Cat/out.tsv");
        assert_eq!(fs::read_to_string(&out).unwrap(), "FAST");
        std::thread::sleep(Duration::from_millis(600));
        assert_eq!(fs::read_to_string(&out).unwrap(), "FAST");
    }

    #[test]
    fn test_timed_out_parser_has_returned_when_dispatch_ends() {
        let fx = fixture();
        let slow: Arc<dyn ArtifactParser> =
            Arc::new(|_: &[PathBuf], folder: &Path, _: &dyn FileSeeker, _: bool| -> Result<()> {
                std::thread::sleep(Duration::from_millis(200));
                fs::write(folder.join("late.txt"), "done")?;
                Ok(())
            });
        let plugins = vec![plugin("Slow", "Logs", &["logs/*.csv"], slow)];

        let progress = quiet_progress(1);
        let options = DispatchOptions {
            wrap_text: true,
            plugin_timeout: Some(Duration::from_millis(20)),
        };
        crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            options,
        )
        .unwrap();

        assert!(fx.report.path().join("Logs/late.txt").exists());
    }

    #[test]
    fn test_no_match_skips_plugin() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let plugins = vec![plugin(
            "Parrot",
            "Parrot",
            &["**/*.pud"],
            recording(calls.clone(), "Parrot"),
        )];

        let progress = quiet_progress(1);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(summary.outcomes[0].status, PluginStatus::NoMatch);
        assert!(!fx.report.path().join("Parrot").exists());
        assert!(audit_text(&fx).contains("No file found for regex **/*.pud"));
    }

    #[test]
    fn test_overlapping_patterns_collapse() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let plugins = vec![plugin(
            "Overlap",
            "Logs",
            &["logs/flight1.csv", "logs/*.csv"],
            recording(calls.clone(), "Overlap"),
        )];

        let progress = quiet_progress(1);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        assert_eq!(calls.lock().unwrap()[0].1, 2);
        let files = &summary.outcomes[0].files;
        assert!(files[0].ends_with("flight1.csv"));
        assert!(files[1].ends_with("flight2.csv"));
    }

    #[test]
    fn test_bad_pattern_is_isolated_failure() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let plugins = vec![
            plugin("Broken", "Logs", &["logs/[a-"], recording(calls.clone(), "Broken")),
            plugin("Good", "Logs", &["logs/*.csv"], recording(calls.clone(), "Good")),
        ];

        let progress = quiet_progress(2);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        assert!(summary.outcomes[0].is_failure());
        assert_eq!(summary.outcomes[1].status, PluginStatus::Completed);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_patterns_after_a_bad_one_are_still_audited() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let plugins = vec![plugin(
            "P",
            "Logs",
            &["logs/[a-", "logs/*.csv"],
            recording(calls.clone(), "P"),
        )];

        let progress = quiet_progress(1);
        let summary = crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();

        match &summary.outcomes[0].status {
            PluginStatus::Failed(detail) => assert!(detail.contains("logs/[a-"), "{}", detail),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(calls.lock().unwrap().is_empty());

        let text = audit_text(&fx);
        assert!(text.contains("Search failed for regex logs/[a-"));
        assert!(text.contains("2 files for regex logs/*.csv located at:"));
    }

    #[test]
    fn test_failure_trace_keeps_the_cause() {
        let e = anyhow!("truncated record").context("Failed to parse FLY001.DAT");
        let trace = failure_trace(&e);
        assert!(trace.contains("Failed to parse FLY001.DAT"));
        assert!(trace.contains("Caused by"));
        assert!(trace.contains("truncated record"));
    }

    #[test]
    fn test_progress_is_monotonic() {
        let fx = fixture();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let plugins = vec![
            plugin("A", "Logs", &["logs/*.csv"], recording(calls.clone(), "A")),
            plugin("B", "Logs", &["**/*.none"], recording(calls.clone(), "B")),
            plugin("C", "Logs", &["**/*.txt"], recording(calls.clone(), "C")),
        ];

        let mut seq = Sequence::new();
        let mut progress = MockProgressSink::new();
        progress
            .expect_set_total()
            .with(eq(3))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        for value in 1..=3 {
            progress
                .expect_set_progress()
                .with(eq(value))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }

        crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            DispatchOptions::default(),
        )
        .unwrap();
    }

    #[test]
    fn test_wrap_flag_and_category_folder_passed_through() {
        let fx = fixture();
        let seen = Arc::new(Mutex::new(None));
        let seen_in_parser = seen.clone();
        let parser: Arc<dyn ArtifactParser> = Arc::new(
            move |_: &[PathBuf], folder: &Path, _: &dyn FileSeeker, wrap: bool| -> Result<()> {
                *seen_in_parser.lock().unwrap() = Some((folder.to_path_buf(), wrap));
                Ok(())
            },
        );
        let plugins = vec![plugin("Csv", "Flight Logs", &["logs/*.csv"], parser)];

        let progress = quiet_progress(1);
        let options = DispatchOptions {
            wrap_text: false,
            plugin_timeout: None,
        };
        crunch_artifacts(
            &plugins,
            fx.seeker.clone(),
            fx.report.path(),
            &fx.audit,
            &progress,
            options,
        )
        .unwrap();

        let (folder, wrap) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(folder, fx.report.path().join("Flight Logs"));
        assert!(folder.is_dir());
        assert!(!wrap);
    }
}
