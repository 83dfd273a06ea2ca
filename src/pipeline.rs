//! One processing run from validated arguments to finished report.
//!
//! The run is split in two halves. [`prepare`] does everything that can fail
//! before anything is written: path checks, plugin loading, profile loading.
//! [`execute`] then opens the container inside a fresh report folder,
//! dispatches the plugins and hands the result to the report assembler.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{error, info};

use crate::config::Profile;
use crate::constants::PATH_LIST_NAME;
use crate::dispatch::{crunch_artifacts, AuditLog, DispatchOptions, ProgressSink};
use crate::models::{CaseData, PluginOutcome};
use crate::plugins::loader::PluginLoader;
use crate::plugins::{PluginDescriptor, PluginRegistry};
use crate::report::{format_hms, ReportAssembler, RunReport};
use crate::security::validate_output_path;
use crate::seeker::{open_seeker, ContainerKind, FileSeeker};
use crate::utils::cpu_time::{cpu_time_since, process_cpu_time};
use crate::utils::long_path::{display_path, encode_for_host};
use crate::utils::output::OutputLayout;

/// Arguments of a processing run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub kind: ContainerKind,
    pub input: PathBuf,
    pub output: PathBuf,
    pub profile: Option<PathBuf>,
    pub case_data: CaseData,
    pub options: DispatchOptions,
}

/// A run that passed every precondition.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    /// Plugins to dispatch, in registry order
    pub plugins: Vec<PluginDescriptor>,
    /// Number of plugins the loader provided
    pub available: usize,
    /// Absolute output folder, long-path encoded on Windows
    pub output: PathBuf,
    /// Input as handed to the seeker
    pub input: PathBuf,
}

/// Check that the input exists and the output folder exists and is writable territory.
pub fn validate_paths(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(anyhow!(
            "INPUT file/folder does not exist: {}",
            input.display()
        ));
    }
    if !output.is_dir() {
        return Err(anyhow!("OUTPUT folder does not exist: {}", output.display()));
    }
    validate_output_path(output)
}

/// Run every pre-dispatch check. Nothing is written to disk.
pub fn prepare(config: &RunConfig, loader: &dyn PluginLoader) -> Result<PreparedRun> {
    validate_paths(&config.input, &config.output)?;

    let profile = match &config.profile {
        Some(path) => Some(Profile::load(path)?),
        None => None,
    };
    let registry = loader.load()?;
    let plugins = registry.select(profile.as_ref());

    let output = if config.output.is_absolute() {
        config.output.clone()
    } else {
        env::current_dir()
            .context("Failed to resolve the current directory")?
            .join(&config.output)
    };
    let input = match config.kind {
        ContainerKind::Fs => encode_for_host(&config.input),
        _ => config.input.clone(),
    };

    Ok(PreparedRun {
        plugins,
        available: registry.len(),
        output: encode_for_host(&output),
        input,
    })
}

/// Open the container, dispatch and report.
///
/// If the container cannot be opened the report folder is removed again and
/// the error is returned before any plugin runs. The temp folder is removed
/// whatever the outcome.
pub fn execute(
    config: &RunConfig,
    prepared: &PreparedRun,
    layout: &OutputLayout,
    assembler: &dyn ReportAssembler,
    progress: &dyn ProgressSink,
) -> Result<RunReport> {
    let started = Instant::now();
    let cpu_start = process_cpu_time();
    info!("Processing started. Please wait. This may take a few minutes...");
    info!("dleapp v{}", env!("CARGO_PKG_VERSION"));

    let seeker = match open_seeker(config.kind, &prepared.input, &layout.temp_folder) {
        Ok(seeker) => seeker,
        Err(e) => {
            error!("Had an exception in Seeker, terminating: {}", e);
            layout.discard();
            return Err(e).context("Failed to open the input container");
        }
    };

    let result = dispatch_plugins(config, prepared, layout, seeker, progress)
        .map(|outcomes| {
            build_run_report(
                config,
                &layout.report_folder_base,
                &prepared.input,
                outcomes,
                started.elapsed(),
                cpu_time_since(cpu_start),
            )
        })
        .and_then(|report| {
            info!("Processes completed.");
            info!("Processing time = {}", report.elapsed_hms);
            assembler.generate_report(&report)?;
            Ok(report)
        });
    layout.cleanup_temp();
    result
}

fn dispatch_plugins(
    config: &RunConfig,
    prepared: &PreparedRun,
    layout: &OutputLayout,
    seeker: Arc<dyn FileSeeker>,
    progress: &dyn ProgressSink,
) -> Result<Vec<PluginOutcome>> {
    let input_shown = display_path(&prepared.input);
    if let Some(profile) = &config.profile {
        info!("Loaded profile: {}", profile.display());
    }
    info!(
        "Artifact categories to parse: {} of {}",
        prepared.plugins.len(),
        prepared.available
    );
    info!("File/Directory selected: {}", input_shown);

    let audit = AuditLog::create(&layout.audit_log_path())?;
    audit.record_input(&input_shown)?;

    let summary = crunch_artifacts(
        &prepared.plugins,
        seeker,
        &layout.report_folder_base,
        &audit,
        progress,
        config.options,
    )?;
    info!("Dispatch finished in {:.2}s", summary.elapsed.as_secs_f64());
    Ok(summary.outcomes)
}

/// Assemble the hand-off for the report. Every path in it has the
/// long-path marker removed.
pub fn build_run_report(
    config: &RunConfig,
    report_folder_base: &Path,
    input: &Path,
    outcomes: Vec<PluginOutcome>,
    elapsed: Duration,
    cpu: Option<Duration>,
) -> RunReport {
    RunReport {
        report_folder_base: PathBuf::from(display_path(report_folder_base)),
        elapsed_secs: elapsed.as_secs_f64(),
        cpu_secs: cpu.map(|c| c.as_secs_f64()),
        elapsed_hms: format_hms(elapsed),
        kind: config.kind,
        input_path: display_path(input),
        case_data: config.case_data.clone(),
        outcomes,
    }
}

/// Append every search pattern of every plugin to `<dir>/path_list.txt`.
///
/// Returns the patterns in registry order.
pub fn write_artifact_paths(registry: &PluginRegistry, dir: &Path) -> Result<Vec<String>> {
    let path = dir.join(PATH_LIST_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .context(format!("Failed to open {}", path.display()))?;

    let patterns: Vec<String> = registry.search_patterns().map(str::to_string).collect();
    for pattern in &patterns {
        writeln!(file, "{}", pattern).context(format!("Failed to write {}", path.display()))?;
    }
    Ok(patterns)
}
