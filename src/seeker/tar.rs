use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ::tar::{Archive, Entries};
use flate2::read::MultiGzDecoder;
use log::{debug, info};

use crate::seeker::pattern::{compile_pattern, normalize_member_path};
use crate::seeker::staging::StagingArea;
use crate::seeker::{FileSeeker, SeekerError};

/// Seeker over a tar or gzip-compressed tar archive.
///
/// Tar has no central directory, so the member list is collected with one
/// full pass at construction. Staging needs another pass; all members
/// matched by a single search that are not staged yet are extracted in that
/// one pass. Passes are serialized by `pass_lock`.
pub struct TarSeeker {
    path: PathBuf,
    gzip: bool,
    members: Vec<String>,
    staging: StagingArea,
    pass_lock: Mutex<()>,
}

impl TarSeeker {
    /// Open and index `path`. When `gzip` is set the archive is decompressed
    /// on the fly.
    pub fn open(path: &Path, temp_folder: &Path, gzip: bool) -> Result<Self, SeekerError> {
        let mut members = Vec::new();
        let mut seen = HashSet::new();
        {
            let mut archive = open_archive(path, gzip)?;
            let index_err = |e: io::Error| SeekerError::Index {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            let entries = archive.entries().map_err(index_err)?;
            for entry in entries {
                let entry = entry.map_err(index_err)?;
                if !entry.header().entry_type().is_file() {
                    continue;
                }
                let name = normalize_member_path(&entry.path().map_err(index_err)?.to_string_lossy());
                // Later copies of an appended member are ignored.
                if seen.insert(name.clone()) {
                    members.push(name);
                }
            }
        }

        let staging = StagingArea::new(temp_folder).map_err(|source| SeekerError::Open {
            path: temp_folder.to_path_buf(),
            source,
        })?;

        info!("Indexed {} members in {}", members.len(), path.display());
        Ok(TarSeeker {
            path: path.to_path_buf(),
            gzip,
            members,
            staging,
            pass_lock: Mutex::new(()),
        })
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of members that have been read out of the archive.
    pub fn staged_count(&self) -> usize {
        self.staging.staged_count()
    }

    /// Extract every member in `pending` with a single pass over the archive.
    fn stage_pending(&self, pending: &HashSet<&str>) -> Result<(), SeekerError> {
        let _pass = self.pass_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have staged some of them while we waited.
        let still_pending: HashSet<&str> = pending
            .iter()
            .copied()
            .filter(|name| self.staging.cached(name).is_none())
            .collect();
        if still_pending.is_empty() {
            return Ok(());
        }
        debug!(
            "Staging {} members from {}",
            still_pending.len(),
            self.path.display()
        );

        let index_err = |e: io::Error| SeekerError::Index {
            path: self.path.clone(),
            reason: e.to_string(),
        };
        if self.gzip {
            let mut archive = open_archive(&self.path, true)?;
            let entries = archive.entries().map_err(index_err)?;
            self.stage_from_entries(entries, &still_pending)
        } else {
            let file = File::open(&self.path).map_err(|source| SeekerError::Open {
                path: self.path.clone(),
                source,
            })?;
            let mut archive = Archive::new(file);
            let entries = archive.entries_with_seek().map_err(index_err)?;
            self.stage_from_entries(entries, &still_pending)
        }
    }

    fn stage_from_entries<R: Read>(
        &self,
        entries: Entries<'_, R>,
        pending: &HashSet<&str>,
    ) -> Result<(), SeekerError> {
        let mut remaining = pending.len();
        for entry in entries {
            let mut entry = entry.map_err(|e| SeekerError::Index {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = match entry.path() {
                Ok(p) => normalize_member_path(&p.to_string_lossy()),
                Err(_) => continue,
            };
            if !pending.contains(name.as_str()) || self.staging.cached(&name).is_some() {
                continue;
            }
            self.staging
                .get_or_stage(&name, |writer| io::copy(&mut entry, writer))?;
            remaining -= 1;
            if remaining == 0 {
                break;
            }
        }
        Ok(())
    }
}

fn open_archive(path: &Path, gzip: bool) -> Result<Archive<Box<dyn Read>>, SeekerError> {
    let file = File::open(path).map_err(|source| SeekerError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read> = if gzip {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(Archive::new(reader))
}

impl FileSeeker for TarSeeker {
    fn search(&self, pattern: &str) -> Result<Vec<PathBuf>, SeekerError> {
        let regex = compile_pattern(pattern)?;
        let matched: Vec<&str> = self
            .members
            .iter()
            .filter(|name| regex.is_match(name))
            .map(String::as_str)
            .collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let pending: HashSet<&str> = matched
            .iter()
            .copied()
            .filter(|name| self.staging.cached(name).is_none())
            .collect();
        if !pending.is_empty() {
            self.stage_pending(&pending)?;
        }

        matched
            .into_iter()
            .map(|name| {
                self.staging.cached(name).ok_or_else(|| SeekerError::Stage {
                    member: name.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::NotFound,
                        "member disappeared from the archive",
                    ),
                })
            })
            .collect()
    }
}
