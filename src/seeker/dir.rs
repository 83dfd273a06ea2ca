use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::seeker::pattern::{compile_pattern, normalize_member_path};
use crate::seeker::{FileSeeker, SeekerError};

/// Seeker over an extraction that was copied to a folder.
///
/// The tree is walked once when the seeker is built. Searches match the
/// path relative to the root and return the native absolute path, which is
/// already readable so nothing is staged.
pub struct DirSeeker {
    root: PathBuf,
    files: Vec<(String, PathBuf)>,
}

impl DirSeeker {
    pub fn new(root: &Path) -> Result<Self, SeekerError> {
        let metadata = std::fs::metadata(root).map_err(|source| SeekerError::Open {
            path: root.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(SeekerError::Open {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Unreadable subtrees are skipped, the rest of the image is still useful.
                    warn!("Skipping unreadable path while indexing: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let key = normalize_member_path(&relative.to_string_lossy());
            files.push((key, entry.into_path()));
        }

        info!("Indexed {} files under {}", files.len(), root.display());
        Ok(DirSeeker {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl FileSeeker for DirSeeker {
    fn search(&self, pattern: &str) -> Result<Vec<PathBuf>, SeekerError> {
        let regex = compile_pattern(pattern)?;
        let found: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|(key, _)| regex.is_match(key))
            .map(|(_, path)| path.clone())
            .collect();
        debug!("Pattern {} matched {} files", pattern, found.len());
        Ok(found)
    }
}
