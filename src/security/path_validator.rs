//! Path sanitization for staged archive members and report folders.
//!
//! Archive member names and plugin categories come from untrusted or
//! third-party sources. Before either becomes part of a path on the analyst's
//! machine it goes through this module so that nothing can escape the
//! scratch directory or the report folder.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Sanitizes a filename to remove potentially dangerous characters.
///
/// This function removes or replaces characters that could be problematic
/// in filenames across different operating systems.
///
/// # Arguments
///
/// * `filename` - The filename to sanitize
///
/// # Returns
///
/// A sanitized filename safe for use on all platforms
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::with_capacity(filename.len());

    for ch in filename.chars() {
        match ch {
            // Replace path separators
            '/' | '\\' => sanitized.push('_'),
            // Remove null bytes
            '\0' => continue,
            // Replace other problematic characters
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            // Control characters
            c if c.is_control() => sanitized.push('_'),
            // Keep everything else
            c => sanitized.push(c),
        }
    }

    // Don't allow only dots
    if sanitized.chars().all(|c| c == '.') {
        sanitized = format!("_{}", sanitized);
    }

    // Trim dots and spaces from ends
    let trimmed = sanitized.trim_matches(|c| c == '.' || c == ' ').to_string();

    // Don't allow empty names
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed
    }
}

/// Map an archive member name to a relative path that stays inside a base.
///
/// `.`, `..`, root and drive components are dropped and every remaining
/// segment is passed through [`sanitize_filename`]. A name with no usable
/// segment maps to `unnamed`.
pub fn safe_relative_path(member: &str) -> PathBuf {
    let mut relative = PathBuf::new();
    for segment in member.split(|c: char| c == '/' || c == '\\') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        // Drive designators such as `C:` only appear as the first segment.
        if relative.as_os_str().is_empty()
            && segment.len() == 2
            && segment.ends_with(':')
            && segment.as_bytes()[0].is_ascii_alphabetic()
        {
            continue;
        }
        relative.push(sanitize_filename(segment));
    }
    if relative.as_os_str().is_empty() {
        relative.push("unnamed");
    }
    relative
}

/// Validates that a path is safe for report output.
///
/// Reports must never be written over system locations.
///
/// # Arguments
///
/// * `path` - The output path to validate
///
/// # Returns
///
/// * `Ok(())` - If the path is safe for output
/// * `Err` - If the path is unsafe
pub fn validate_output_path(path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy().to_lowercase().replace('\\', "/");
    let path_str = path_str.trim_start_matches("//?/");

    let dangerous_paths = [
        "/etc",
        "/sys",
        "/proc",
        "/dev",
        "/boot",
        "c:/windows",
        "c:/program files",
        "c:/programdata",
        "/system",
        "/library",
        "/usr",
    ];

    for dangerous in dangerous_paths {
        if path_str == dangerous || path_str.starts_with(&format!("{}/", dangerous)) {
            return Err(anyhow!(
                "Cannot write reports to system directory: {}",
                path.display()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("normal.txt"), "normal.txt");
        assert_eq!(sanitize_filename("DJI Flight Logs"), "DJI Flight Logs");
        assert_eq!(sanitize_filename("file<>:\"|?*.txt"), "file_______.txt");
        assert_eq!(sanitize_filename("file\0name"), "filename");
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("..."), "_");
        assert_eq!(sanitize_filename("  spaces  "), "spaces");
        assert_eq!(sanitize_filename("file."), "file");
        assert_eq!(sanitize_filename(" . "), "unnamed");
    }

    #[test]
    fn test_safe_relative_path_keeps_structure() {
        assert_eq!(
            safe_relative_path("logs/flight1.csv"),
            PathBuf::from("logs").join("flight1.csv")
        );
        assert_eq!(
            safe_relative_path("./DJI/FlightRecord/rec.txt"),
            PathBuf::from("DJI").join("FlightRecord").join("rec.txt")
        );
    }

    #[test]
    fn test_safe_relative_path_blocks_escape() {
        let escapes = [
            "../../etc/passwd",
            "/etc/passwd",
            r"..\..\windows\system32",
            r"C:\evil.txt",
            "a/../../b",
        ];
        for member in escapes {
            let rel = safe_relative_path(member);
            assert!(rel.is_relative(), "{} produced {:?}", member, rel);
            assert!(
                rel.components().all(|c| matches!(c, std::path::Component::Normal(_))),
                "{} produced {:?}",
                member,
                rel
            );
        }
        assert_eq!(safe_relative_path("/etc/passwd"), PathBuf::from("etc").join("passwd"));
    }

    #[test]
    fn test_safe_relative_path_empty() {
        assert_eq!(safe_relative_path(""), PathBuf::from("unnamed"));
        assert_eq!(safe_relative_path("../.."), PathBuf::from("unnamed"));
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("/etc")).is_err());
        assert!(validate_output_path(Path::new("/sys/kernel")).is_err());
        assert!(validate_output_path(Path::new("C:\\Windows\\System32\\config")).is_err());
        assert!(validate_output_path(Path::new(r"\\?\C:\Windows\Temp")).is_err());

        assert!(validate_output_path(Path::new("/tmp/output")).is_ok());
        assert!(validate_output_path(Path::new("/home/user/etcetera")).is_ok());
        assert!(validate_output_path(Path::new("/home/user/output")).is_ok());
    }
}
