//! Parser plugins and the registry that holds them.
//!
//! A plugin declares the files it wants through one or more search patterns
//! and receives the matching files through [`ArtifactParser::parse`]. What a
//! parser does with those files is its own business; the dispatcher only
//! guarantees it is called once with every match, and that a failure stays
//! contained to that plugin.
//!
//! Plugins come from a [`loader::PluginLoader`]. The bundled
//! [`loader::DefinitionLoader`] reads YAML plugin definitions and binds each
//! one to a reference parser from [`parsers`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use log::info;

use crate::config::profile::Profile;
use crate::seeker::FileSeeker;

pub mod default_plugins;
pub mod loader;
pub mod parsers;

/// The parsing routine of a plugin.
pub trait ArtifactParser: Send + Sync {
    /// Parse `files` and write report output into `report_folder`.
    ///
    /// `seeker` lets a parser look up companion files (a database's WAL, a
    /// sidecar JSON...). `wrap_text` is the examiner's formatting preference
    /// for long text values.
    fn parse(
        &self,
        files: &[PathBuf],
        report_folder: &Path,
        seeker: &dyn FileSeeker,
        wrap_text: bool,
    ) -> Result<()>;
}

impl<F> ArtifactParser for F
where
    F: Fn(&[PathBuf], &Path, &dyn FileSeeker, bool) -> Result<()> + Send + Sync,
{
    fn parse(
        &self,
        files: &[PathBuf],
        report_folder: &Path,
        seeker: &dyn FileSeeker,
        wrap_text: bool,
    ) -> Result<()> {
        self(files, report_folder, seeker, wrap_text)
    }
}

/// Everything the dispatcher needs to know about a plugin.
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Display name, unique across the registry
    pub name: String,
    /// Report category; also the output folder name
    pub category: String,
    /// Stable machine identifier
    pub module_name: String,
    /// Search patterns, in declaration order
    pub search: Vec<String>,
    pub parser: Arc<dyn ArtifactParser>,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        module_name: impl Into<String>,
        search: Vec<String>,
        parser: Arc<dyn ArtifactParser>,
    ) -> Self {
        PluginDescriptor {
            name: name.into(),
            category: category.into(),
            module_name: module_name.into(),
            search,
            parser,
        }
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("module_name", &self.module_name)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of plugins with unique names.
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
}

impl PluginRegistry {
    /// Build a registry, rejecting duplicate names and plugins without patterns.
    ///
    /// Plugin names key profile selection, so two plugins with the same name
    /// would make a profile ambiguous.
    pub fn new(plugins: Vec<PluginDescriptor>) -> Result<Self> {
        let mut names = HashSet::new();
        for plugin in &plugins {
            if !names.insert(plugin.name.as_str()) {
                bail!(
                    "Duplicate plugin name '{}' (module {}, category {})",
                    plugin.name,
                    plugin.module_name,
                    plugin.category
                );
            }
            if plugin.search.is_empty() || plugin.search.iter().any(|p| p.trim().is_empty()) {
                bail!("Plugin '{}' declares an empty search pattern", plugin.name);
            }
        }
        Ok(PluginRegistry { plugins })
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Plugins to dispatch, in registry order.
    ///
    /// With a profile only the plugins it names are kept. Names that no longer
    /// exist in the registry are logged and ignored.
    pub fn select(&self, profile: Option<&Profile>) -> Vec<PluginDescriptor> {
        let profile = match profile {
            Some(profile) => profile,
            None => return self.plugins.clone(),
        };

        for missing in profile.plugins.iter().filter(|name| self.get(name).is_none()) {
            info!("Profile names plugin '{}' which is not available, ignoring", missing);
        }

        let wanted: HashSet<&str> = profile.plugins.iter().map(String::as_str).collect();
        self.plugins
            .iter()
            .filter(|p| wanted.contains(p.name.as_str()))
            .cloned()
            .collect()
    }

    /// Every search pattern of every plugin, in registry order.
    pub fn search_patterns(&self) -> impl Iterator<Item = &str> {
        self.plugins
            .iter()
            .flat_map(|p| p.search.iter().map(String::as_str))
    }
}
