use std::env;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use rust_dleapp::cli::{Args, Commands, CreateProfileOpts};
use rust_dleapp::config::Profile;
use rust_dleapp::dispatch::{DispatchOptions, LogProgress};
use rust_dleapp::models::CaseData;
use rust_dleapp::pipeline::{self, RunConfig};
use rust_dleapp::plugins::loader::{DefinitionLoader, PluginDefinitions, PluginLoader};
use rust_dleapp::report::SummaryReport;
use rust_dleapp::utils::long_path::display_path;
use rust_dleapp::utils::output::{OutputLayout, RunLogWriter};

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();
    let loader = DefinitionLoader::new(args.plugins.clone());

    // Handle subcommands
    if let Some(cmd) = &args.command {
        initialize_logging(args.verbose, None)?;
        return handle_subcommand(cmd, &loader);
    }

    if args.artifact_paths {
        initialize_logging(args.verbose, None)?;
        return print_artifact_paths(&loader);
    }

    // Check preconditions before anything is written
    let config = build_run_config(&args)?;
    let prepared = pipeline::prepare(&config, &loader)?;

    // Setup report folder and logging into it
    let layout = OutputLayout::create(&prepared.output)?;
    let run_log = layout.open_run_log()?;
    initialize_logging(args.verbose, Some(run_log))?;
    info!("Report folder: {}", display_path(&layout.report_folder_base));

    let report = match pipeline::execute(
        &config,
        &prepared,
        &layout,
        &SummaryReport,
        &LogProgress::default(),
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };

    if report.failed_count() > 0 {
        info!(
            "{} plugin(s) had errors, see {}",
            report.failed_count(),
            display_path(&layout.run_log_path())
        );
    }
    info!("Report location: {}", report.report_folder_base.display());
    Ok(())
}

/// Initialize logging with the specified verbosity level.
///
/// With a run log every message also goes to that file.
fn initialize_logging(verbose: bool, run_log: Option<RunLogWriter>) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(writer) = run_log {
        loggers.push(WriteLogger::new(log_level, Config::default(), writer));
    }
    CombinedLogger::init(loggers).context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands (create-profile, list-plugins, init-plugins)
fn handle_subcommand(cmd: &Commands, loader: &DefinitionLoader) -> Result<()> {
    match cmd {
        Commands::CreateProfile(opts) => create_profile(opts, loader),
        Commands::ListPlugins => {
            let registry = loader.load()?;
            let mut rows: Vec<_> = registry
                .plugins()
                .iter()
                .map(|p| (p.category.as_str(), p.name.as_str(), p.module_name.as_str()))
                .collect();
            rows.sort();
            for (category, name, module_name) in rows {
                println!("{:<24} {} [{}]", category, name, module_name);
            }
            Ok(())
        }
        Commands::InitPlugins { path } => {
            info!("Creating plugin definitions file at {}", path.display());
            PluginDefinitions::create_default_file(path)?;
            info!("Plugin definitions created successfully");
            Ok(())
        }
    }
}

fn create_profile(opts: &CreateProfileOpts, loader: &DefinitionLoader) -> Result<()> {
    if !opts.dir.is_dir() {
        return Err(anyhow!(
            "OUTPUT folder for storing dleapp profile file does not exist: {}",
            opts.dir.display()
        ));
    }
    let registry = loader.load()?;
    let profile = Profile::for_plugins(&opts.select, &registry)?;
    let path = profile.save_named(&opts.dir, &opts.name)?;
    info!(
        "Profile with {} plugins saved to {}",
        profile.plugins.len(),
        path.display()
    );
    Ok(())
}

fn print_artifact_paths(loader: &DefinitionLoader) -> Result<()> {
    info!("Artifact path list generation started.");
    let registry = loader.load()?;
    let cwd = env::current_dir().context("Failed to resolve the current directory")?;
    for pattern in pipeline::write_artifact_paths(&registry, &cwd)? {
        println!("{}", pattern);
    }
    info!("Artifact path list generation completed");
    Ok(())
}

/// Collect the run arguments into a [`RunConfig`]
fn build_run_config(args: &Args) -> Result<RunConfig> {
    let (kind, input, output) = args.run_arguments()?;
    let case_data = match &args.case_data {
        Some(path) => CaseData::from_json_file(path)?,
        None => CaseData::default(),
    };
    Ok(RunConfig {
        kind,
        input,
        output,
        profile: args.load_profile.clone(),
        case_data,
        options: DispatchOptions {
            wrap_text: args.wrap_text(),
            plugin_timeout: args.plugin_timeout(),
        },
    })
}
