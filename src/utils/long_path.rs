//! Windows long-path handling.
//!
//! Extractions copied to a file system folder routinely contain paths longer
//! than the 260 character `MAX_PATH` limit. On Windows the input folder (for
//! `fs` containers) and the output folder are rewritten with the `\\?\`
//! verbatim prefix before the seeker is built. The prefix never leaves the
//! process: everything written to the audit log or the report goes through
//! [`display_path`] first.

use std::path::{Path, PathBuf};

use crate::constants::LONG_PATH_PREFIX;

/// Returns `true` if the path text starts with a drive letter (`C:`).
fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Prefix a drive-letter path with the long-path marker.
///
/// Forward slashes are converted to backslashes because verbatim paths are
/// not normalized by the Win32 layer. Paths that are already prefixed or that
/// have no drive letter (UNC shares, relative paths) are returned unchanged.
pub fn add_long_path_prefix(path: &str) -> String {
    if path.starts_with(LONG_PATH_PREFIX) || !has_drive_letter(path) {
        return path.to_string();
    }
    format!("{}{}", LONG_PATH_PREFIX, path.replace('/', "\\"))
}

/// Remove the long-path marker if present.
pub fn strip_long_path_prefix(path: &str) -> &str {
    path.strip_prefix(LONG_PATH_PREFIX).unwrap_or(path)
}

/// Apply the long-path marker when running on Windows; a no-op elsewhere.
pub fn encode_for_host(path: &Path) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(add_long_path_prefix(&path.to_string_lossy()))
    } else {
        path.to_path_buf()
    }
}

/// Render a path for persisted output with the long-path marker removed.
pub fn display_path(path: &Path) -> String {
    strip_long_path_prefix(&path.to_string_lossy()).to_string()
}
