use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ::zip::ZipArchive;
use log::info;

use crate::seeker::pattern::{compile_pattern, normalize_member_path};
use crate::seeker::staging::StagingArea;
use crate::seeker::{FileSeeker, SeekerError};

/// Seeker over a zip archive.
///
/// The central directory gives random access, so each member is staged on
/// its own the first time a search matches it.
pub struct ZipSeeker {
    path: PathBuf,
    archive: Mutex<ZipArchive<BufReader<File>>>,
    /// Normalized member name, in archive order, paired with the stored name.
    members: Vec<(String, String)>,
    staging: StagingArea,
}

impl ZipSeeker {
    pub fn open(path: &Path, temp_folder: &Path) -> Result<Self, SeekerError> {
        let file = File::open(path).map_err(|source| SeekerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| SeekerError::Index {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut members = Vec::with_capacity(archive.len());
        let mut seen = HashSet::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|e| SeekerError::Index {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            if entry.is_dir() {
                continue;
            }
            let stored = entry.name().to_string();
            let name = normalize_member_path(&stored);
            if seen.insert(name.clone()) {
                members.push((name, stored));
            }
        }

        let staging = StagingArea::new(temp_folder).map_err(|source| SeekerError::Open {
            path: temp_folder.to_path_buf(),
            source,
        })?;

        info!("Indexed {} members in {}", members.len(), path.display());
        Ok(ZipSeeker {
            path: path.to_path_buf(),
            archive: Mutex::new(archive),
            members,
            staging,
        })
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of members that have been read out of the archive.
    pub fn staged_count(&self) -> usize {
        self.staging.staged_count()
    }

    fn stage(&self, name: &str, stored: &str) -> Result<PathBuf, SeekerError> {
        self.staging.get_or_stage(name, |writer| {
            let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
            let mut member = archive
                .by_name(stored)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            io::copy(&mut member, writer)
        })
    }
}

impl FileSeeker for ZipSeeker {
    fn search(&self, pattern: &str) -> Result<Vec<PathBuf>, SeekerError> {
        let regex = compile_pattern(pattern)?;
        let mut found = Vec::new();
        for (name, stored) in &self.members {
            if regex.is_match(name) {
                found.push(self.stage(name, stored)?);
            }
        }
        if !found.is_empty() {
            log::debug!(
                "Pattern {} matched {} members of {}",
                pattern,
                found.len(),
                self.path.display()
            );
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::zip::write::FileOptions;
    use ::zip::ZipWriter;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn build_zip(path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = FileOptions::default();
        zip.add_directory("logs/", options).unwrap();
        zip.start_file("logs/flight1.csv", options).unwrap();
        zip.write_all(b"a,b\n1,2\n").unwrap();
        zip.start_file("logs/flight2.csv", options).unwrap();
        zip.write_all(b"a,b\n3,4\n").unwrap();
        zip.start_file("./DJI/FLY001.DAT", options).unwrap();
        zip.write_all(&[0u8, 1, 2, 3]).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_zip_index_skips_directories() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        build_zip(&archive);
        let seeker = ZipSeeker::open(&archive, &temp.path().join("temp")).unwrap();
        assert_eq!(seeker.member_count(), 3);
    }

    #[test]
    fn test_zip_search_and_stage() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        build_zip(&archive);
        let seeker = ZipSeeker::open(&archive, &temp.path().join("temp")).unwrap();

        let found = seeker.search("logs/*.csv").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(fs::read_to_string(&found[0]).unwrap(), "a,b\n1,2\n");
        assert_eq!(seeker.staged_count(), 2);

        let dat = seeker.search("**/*.dat").unwrap();
        assert_eq!(dat.len(), 1);
        assert_eq!(fs::read(&dat[0]).unwrap(), vec![0u8, 1, 2, 3]);
    }

    #[test]
    fn test_zip_member_staged_once() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        build_zip(&archive);
        let seeker = ZipSeeker::open(&archive, &temp.path().join("temp")).unwrap();

        let first = seeker.search("logs/flight1.csv").unwrap();
        let second = seeker.search("**/flight1.*").unwrap();
        assert_eq!(first, second);
        assert_eq!(seeker.staged_count(), 1);
    }

    #[test]
    fn test_colliding_member_names_keep_their_content() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("image.zip");
        let mut zip = ZipWriter::new(File::create(&archive).unwrap());
        zip.start_file("logs/a:b.csv", FileOptions::default()).unwrap();
        zip.write_all(b"FIRST").unwrap();
        zip.start_file("logs/a_b.csv", FileOptions::default()).unwrap();
        zip.write_all(b"SECOND").unwrap();
        zip.finish().unwrap();
        let seeker = ZipSeeker::open(&archive, &temp.path().join("temp")).unwrap();

        let first = seeker.search("logs/a:b.csv").unwrap();
        let second = seeker.search("logs/a_b.csv").unwrap();
        assert_eq!(fs::read_to_string(&first[0]).unwrap(), "FIRST");
        assert_eq!(fs::read_to_string(&second[0]).unwrap(), "SECOND");
        assert_eq!(fs::read_to_string(&first[0]).unwrap(), "FIRST");

        let all = seeker.search("logs/*.csv").unwrap();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0], all[1]);
    }
}
