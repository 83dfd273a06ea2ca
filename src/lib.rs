//! # dleapp
//!
//! Drone Logs, Events, and Properties Parser: a batch artifact extractor for
//! drone and controller extractions.
//!
//! ## Overview
//!
//! An acquired image (a copied folder, a tar, a gzip-compressed tar or a zip)
//! is opened through a [`seeker::FileSeeker`]. Every selected plugin declares
//! the files it wants with glob patterns; the dispatcher resolves those
//! patterns, hands the matches to the plugin's parser and records what was
//! found in an audit log. A failing plugin never stops the run.
//!
//! ## Features
//!
//! - **Four container types** behind one search interface, with lazy,
//!   cached extraction of archive members
//! - **Profiles**: saved plugin selections that can be re-applied
//! - **Fault isolation**: parser errors, panics and timeouts are contained
//! - **Audit trail** of every pattern searched and every file found
//! - **YAML plugin definitions** bound to built-in parse routines
//!
//! ## Usage
//!
//! ```no_run
//! use rust_dleapp::dispatch::{DispatchOptions, LogProgress};
//! use rust_dleapp::models::CaseData;
//! use rust_dleapp::pipeline::{execute, prepare, RunConfig};
//! use rust_dleapp::plugins::loader::DefinitionLoader;
//! use rust_dleapp::report::SummaryReport;
//! use rust_dleapp::seeker::ContainerKind;
//! use rust_dleapp::utils::output::OutputLayout;
//! use std::path::PathBuf;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = RunConfig {
//!     kind: ContainerKind::Zip,
//!     input: PathBuf::from("/cases/sd.zip"),
//!     output: PathBuf::from("/cases/out"),
//!     profile: None,
//!     case_data: CaseData::default(),
//!     options: DispatchOptions::default(),
//! };
//!
//! let prepared = prepare(&config, &DefinitionLoader::default())?;
//! let layout = OutputLayout::create(&prepared.output)?;
//! let report = execute(&config, &prepared, &layout, &SummaryReport, &LogProgress::default())?;
//!
//! println!("Processed {} files", report.processed_file_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`models`]: Case data and plugin outcomes
//! - [`seeker`]: Pattern search over the four container types
//! - [`plugins`]: Plugin descriptors, registry, loader and reference parsers
//! - [`config`]: Saved profiles
//! - [`dispatch`]: Dispatcher, audit log and progress reporting
//! - [`report`]: Report hand-off and the default summary report
//! - [`pipeline`]: One run from arguments to report
//! - [`utils`]: Hashing, long-path handling, output layout
//! - [`security`]: Path sanitization
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models shared by the dispatcher and the report
pub mod models;

/// Container seekers
pub mod seeker;

/// Parser plugins and their registry
pub mod plugins;

/// Profile management
pub mod config;

/// Plugin dispatch with fault isolation
pub mod dispatch;

/// Report generation hand-off
pub mod report;

/// Run orchestration
pub mod pipeline;

/// Utility functions for hashing, paths and output layout
pub mod utils;

/// Application constants and configuration values
pub mod constants;

/// Security utilities for path sanitization
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
