use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::constants::DEFAULT_PLUGINS_FILE;
use crate::seeker::ContainerKind;

/// Command-line arguments for dleapp.
///
/// A processing run needs `-t`, `-i` and `-o`. `--artifact-paths` and the
/// subcommands work without them.
#[derive(Parser, Debug)]
#[clap(
    name = "dleapp",
    version,
    about = "Drone Logs, Events, and Properties Parser"
)]
pub struct Args {
    /// Type of input: a folder (fs), tar, gzip-compressed tar (gz) or zip
    #[clap(short = 't', value_enum)]
    pub container: Option<ContainerKind>,

    /// Path to input file/folder
    #[clap(short, long = "input-path")]
    pub input: Option<PathBuf>,

    /// Output folder path
    #[clap(short, long = "output-path")]
    pub output: Option<PathBuf>,

    /// Do not wrap text in report output
    #[clap(short = 'w', long)]
    pub no_wrap: bool,

    /// Path to a dleapp profile file (.dlprofile)
    #[clap(short = 'l', long)]
    pub load_profile: Option<PathBuf>,

    /// Append every artifact search pattern to path_list.txt and exit
    #[clap(short = 'p', long)]
    pub artifact_paths: bool,

    /// YAML plugin definitions (default: built-in plugins)
    #[clap(long, global = true)]
    pub plugins: Option<PathBuf>,

    /// JSON file with case data (case number, examiner, ...) for the report
    #[clap(long)]
    pub case_data: Option<PathBuf>,

    /// Fail a plugin whose parser runs longer than this many seconds
    #[clap(long)]
    pub plugin_timeout: Option<u64>,

    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    /// The mandatory arguments of a processing run.
    pub fn run_arguments(&self) -> Result<(ContainerKind, PathBuf, PathBuf)> {
        let kind = self
            .container
            .ok_or_else(|| anyhow!("No -t (input type) provided. Run the program again."))?;
        let input = self
            .input
            .clone()
            .ok_or_else(|| anyhow!("No INPUT_PATH provided. Run the program again."))?;
        let output = self
            .output
            .clone()
            .ok_or_else(|| anyhow!("No OUTPUT_PATH provided. Run the program again."))?;
        Ok((kind, input, output))
    }

    pub fn wrap_text(&self) -> bool {
        !self.no_wrap
    }

    pub fn plugin_timeout(&self) -> Option<Duration> {
        self.plugin_timeout.map(Duration::from_secs)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a profile naming a subset of the plugins
    CreateProfile(CreateProfileOpts),

    /// List the available plugins
    ListPlugins,

    /// Write the built-in plugin definitions to a YAML file
    InitPlugins {
        /// Path to output definitions file
        #[clap(default_value = DEFAULT_PLUGINS_FILE)]
        path: PathBuf,
    },
}

/// Options for the create-profile subcommand.
#[derive(ClapArgs, Debug)]
pub struct CreateProfileOpts {
    /// Existing folder to store the profile in
    pub dir: PathBuf,

    /// Profile name; the file is saved as <name>.dlprofile
    #[clap(short, long)]
    pub name: String,

    /// Plugin names to include (comma-separated)
    #[clap(long = "select", value_delimiter = ',', required = true)]
    pub select: Vec<String>,
}
