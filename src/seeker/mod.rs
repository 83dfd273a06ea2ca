//! Container seekers.
//!
//! A seeker answers one question for the dispatcher and for plugins: which
//! files in the acquired image match this pattern, and where can they be read
//! from? Four containers are supported:
//!
//! - **fs**: an extraction already copied to a folder
//! - **tar**: an uncompressed tar archive
//! - **gz**: a gzip-compressed tar archive
//! - **zip**: a zip archive
//!
//! Every variant builds its member index once, at construction. Archive
//! members that match a search are streamed into a private scratch directory
//! the first time they are requested and served from there afterwards.
//!
//! Callers only ever hold a [`FileSeeker`] trait object, so plugins cannot
//! tell which container backs a search.
//!
//! ## Usage Example
//!
//! ```no_run
//! use rust_dleapp::seeker::{open_seeker, ContainerKind};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let seeker = open_seeker(
//!     ContainerKind::Zip,
//!     Path::new("/cases/drone_sd.zip"),
//!     Path::new("/tmp/reports/temp"),
//! )?;
//!
//! for path in seeker.search("**/FlightRecord/*.txt")? {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

mod dir;
mod pattern;
mod staging;
mod tar;
mod zip;

pub use self::dir::DirSeeker;
pub use self::pattern::{compile_pattern, normalize_member_path};
pub use self::tar::TarSeeker;
pub use self::zip::ZipSeeker;

/// Errors raised while building or querying a seeker.
#[derive(Debug, thiserror::Error)]
pub enum SeekerError {
    #[error("Failed to open container {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to index container {path}: {reason}")]
    Index { path: PathBuf, reason: String },
    #[error("Failed to stage archive member {member}: {source}")]
    Stage {
        member: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid search pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}

/// Pattern search over an acquired image.
pub trait FileSeeker: Send + Sync {
    /// Return every file whose path matches `pattern`, in container order.
    ///
    /// Returned paths are readable on the local file system. An empty vector
    /// means nothing matched and is not an error.
    fn search(&self, pattern: &str) -> Result<Vec<PathBuf>, SeekerError>;
}

/// The container types accepted on the command line (`-t`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Extraction copied to a file system folder
    Fs,
    /// Tar archive
    Tar,
    /// Gzip-compressed tar archive
    Gz,
    /// Zip archive
    Zip,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Fs => write!(f, "fs"),
            ContainerKind::Tar => write!(f, "tar"),
            ContainerKind::Gz => write!(f, "gz"),
            ContainerKind::Zip => write!(f, "zip"),
        }
    }
}

/// Build the seeker for `kind`.
///
/// Archive seekers stage members under a fresh directory inside
/// `temp_folder`; that directory is deleted when the seeker is dropped.
/// Failure here means there is nothing to search and the run must stop.
pub fn open_seeker(
    kind: ContainerKind,
    input: &Path,
    temp_folder: &Path,
) -> Result<Arc<dyn FileSeeker>, SeekerError> {
    info!("Opening {} container {}", kind, input.display());
    let seeker: Arc<dyn FileSeeker> = match kind {
        ContainerKind::Fs => Arc::new(DirSeeker::new(input)?),
        ContainerKind::Tar => Arc::new(TarSeeker::open(input, temp_folder, false)?),
        ContainerKind::Gz => Arc::new(TarSeeker::open(input, temp_folder, true)?),
        ContainerKind::Zip => Arc::new(ZipSeeker::open(input, temp_folder)?),
    };
    Ok(seeker)
}
