use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tempfile::TempDir;

use crate::constants::{STAGING_DIR_PREFIX, STAGING_PARTIAL_SUFFIX};
use crate::security::path_validator::safe_relative_path;
use crate::seeker::SeekerError;

type Slot = Arc<Mutex<Option<PathBuf>>>;

/// Scratch area that archive members are materialized into.
///
/// Each staged member gets its own numbered directory, `<scratch>/<n>/<path>`,
/// because sanitized member paths are not unique (`a:b.csv` and `a_b.csv`
/// sanitize to the same name). Each member name owns one slot. The slot's mutex is held while the member
/// is written, so concurrent requests for the same member wait for the first
/// writer and then reuse its path. Members are written to a `.partial`
/// sibling and renamed into place, so a returned path always points at a
/// complete file. The scratch directory is removed when the area is dropped.
pub(crate) struct StagingArea {
    root: TempDir,
    slots: Mutex<HashMap<String, Slot>>,
    staged: AtomicUsize,
    next_dir: AtomicUsize,
}

impl StagingArea {
    /// Create a fresh scratch directory under `parent`.
    pub fn new(parent: &Path) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let root = tempfile::Builder::new()
            .prefix(STAGING_DIR_PREFIX)
            .tempdir_in(parent)?;
        debug!("Staging archive members under {}", root.path().display());
        Ok(StagingArea {
            root,
            slots: Mutex::new(HashMap::new()),
            staged: AtomicUsize::new(0),
            next_dir: AtomicUsize::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Number of members read out of the archive so far.
    pub fn staged_count(&self) -> usize {
        self.staged.load(Ordering::SeqCst)
    }

    fn slot(&self, member: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(member.to_string()).or_default())
    }

    /// Path of an already staged member, if any.
    pub fn cached(&self, member: &str) -> Option<PathBuf> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.get(member)?)
        };
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Return the staged path for `member`, calling `fill` to write it only if
    /// it has not been staged yet.
    pub fn get_or_stage<F>(&self, member: &str, fill: F) -> Result<PathBuf, SeekerError>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<u64>,
    {
        let slot = self.slot(member);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = guard.as_ref() {
            return Ok(path.clone());
        }

        let dest = self
            .write_member(member, fill)
            .map_err(|source| SeekerError::Stage {
                member: member.to_string(),
                source,
            })?;
        *guard = Some(dest.clone());
        Ok(dest)
    }

    fn write_member<F>(&self, member: &str, fill: F) -> io::Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<u64>,
    {
        let dir = self.next_dir.fetch_add(1, Ordering::SeqCst);
        let dest = self
            .root
            .path()
            .join(dir.to_string())
            .join(safe_relative_path(member));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut partial_name = dest
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        partial_name.push(STAGING_PARTIAL_SUFFIX);
        let partial = dest.with_file_name(partial_name);

        match write_then_rename(&partial, &dest, fill) {
            Ok(bytes) => {
                self.staged.fetch_add(1, Ordering::SeqCst);
                debug!("Staged {} ({} bytes)", member, bytes);
                Ok(dest)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }
}

fn write_then_rename<F>(partial: &Path, dest: &Path, fill: F) -> io::Result<u64>
where
    F: FnOnce(&mut dyn Write) -> io::Result<u64>,
{
    let mut writer = BufWriter::new(File::create(partial)?);
    let bytes = fill(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(partial, dest)?;
    Ok(bytes)
}
