use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{PROFILE_EXTENSION, PROFILE_FORMAT_VERSION, PROFILE_SCHEMA_TAG};
use crate::plugins::PluginRegistry;

/// Why a profile could not be loaded.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile file not found: {0}")]
    NotFound(PathBuf),

    #[error("{path} is not a valid dleapp profile: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("Failed to read profile {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A saved selection of plugins, stored as JSON.
///
/// ```json
/// {"leapp": "dleapp", "format_version": 1, "plugins": ["Flight CSV Logs"]}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub leapp: String,
    pub format_version: u32,
    pub plugins: Vec<String>,
}

impl Profile {
    pub fn new(plugins: Vec<String>) -> Self {
        Profile {
            leapp: PROFILE_SCHEMA_TAG.to_string(),
            format_version: PROFILE_FORMAT_VERSION,
            plugins,
        }
    }

    /// Build a profile for `names`, checking each one against `registry`.
    ///
    /// Duplicates collapse to their first occurrence.
    pub fn for_plugins(names: &[String], registry: &PluginRegistry) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut plugins = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name.is_empty() || !seen.insert(name) {
                continue;
            }
            if registry.get(name).is_none() {
                return Err(anyhow!("Unknown plugin '{}'", name));
            }
            plugins.push(name.to_string());
        }
        if plugins.is_empty() {
            return Err(anyhow!("A profile needs at least one plugin"));
        }
        Ok(Profile::new(plugins))
    }

    /// Load and validate a profile.
    ///
    /// Anything other than a JSON object with the right schema tag, version
    /// 1 and a list of plugin names rejects the whole file.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ProfileError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ProfileError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let invalid = |reason: String| ProfileError::Invalid {
            path: path.to_path_buf(),
            reason,
        };

        let value: Value =
            serde_json::from_str(&content).map_err(|e| invalid(format!("malformed JSON: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| invalid("top level is not an object".to_string()))?;

        match object.get("leapp").and_then(Value::as_str) {
            Some(PROFILE_SCHEMA_TAG) => {}
            other => {
                return Err(invalid(format!(
                    "schema tag is {:?}, expected \"{}\"",
                    other, PROFILE_SCHEMA_TAG
                )))
            }
        }
        match object.get("format_version").and_then(Value::as_u64) {
            Some(v) if v == u64::from(PROFILE_FORMAT_VERSION) => {}
            other => {
                return Err(invalid(format!(
                    "format_version is {:?}, expected {}",
                    other, PROFILE_FORMAT_VERSION
                )))
            }
        }

        let profile: Profile =
            serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        debug!(
            "Loaded profile {} with {} plugins",
            path.display(),
            profile.plugins.len()
        );
        Ok(profile)
    }

    /// Write the profile to `<dir>/<name>.dlprofile` and return that path.
    pub fn save_named(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        if !dir.is_dir() {
            return Err(anyhow!("Profile directory does not exist: {}", dir.display()));
        }
        let path = profile_path(dir, name);
        self.save(&path)?;
        Ok(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize profile to JSON")?;
        fs::write(path, json).context(format!("Failed to write profile to {}", path.display()))?;
        info!("Saved profile to {}", path.display());
        Ok(())
    }
}

/// Location of a named profile inside `dir`.
pub fn profile_path(dir: &Path, name: &str) -> PathBuf {
    let name = crate::security::sanitize_filename(name);
    dir.join(format!("{}.{}", name, PROFILE_EXTENSION))
}
