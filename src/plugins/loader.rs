use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::plugins::parsers::ParserKind;
use crate::plugins::{PluginDescriptor, PluginRegistry};

lazy_static! {
    /// Module identifiers end up in file names and logs.
    static ref MODULE_NAME: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// Source of the plugin registry. A failing loader aborts the run before dispatch.
pub trait PluginLoader {
    fn load(&self) -> Result<PluginRegistry>;
}

/// One or more search patterns; YAML accepts a scalar or a list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SearchPatterns {
    One(String),
    Many(Vec<String>),
}

impl SearchPatterns {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SearchPatterns::One(pattern) => vec![pattern],
            SearchPatterns::Many(patterns) => patterns,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PluginDefinition {
    pub name: String,
    pub category: String,
    pub module_name: String,
    pub search: SearchPatterns,
    pub parser: ParserKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A set of plugin definitions as stored in YAML.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PluginDefinitions {
    pub version: String,
    pub description: String,
    pub plugins: Vec<PluginDefinition>,
}

impl PluginDefinitions {
    /// Load definitions from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read plugin definitions: {}", path.display()))?;

        let definitions: PluginDefinitions = serde_yaml::from_str(&content)
            .context("Failed to parse YAML plugin definitions")?;

        debug!("Loaded plugin definitions from {}", path.display());
        Ok(definitions)
    }

    /// Save definitions to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize plugin definitions to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write plugin definitions to {}", path.display()))?;

        info!("Saved plugin definitions to {}", path.display());
        Ok(())
    }

    /// Write the built-in definitions so they can be edited.
    pub fn create_default_file(path: &Path) -> Result<()> {
        Self::default_definitions().save_to_yaml_file(path)
    }

    /// Bind every definition to its parser and build the registry.
    pub fn into_registry(self) -> Result<PluginRegistry> {
        let mut descriptors = Vec::with_capacity(self.plugins.len());
        for definition in self.plugins {
            if !MODULE_NAME.is_match(&definition.module_name) {
                return Err(anyhow!(
                    "Plugin '{}' has an invalid module name '{}'",
                    definition.name,
                    definition.module_name
                ));
            }
            let parser = definition.parser.build(&definition.module_name);
            descriptors.push(PluginDescriptor::new(
                definition.name,
                definition.category,
                definition.module_name,
                definition.search.into_vec(),
                parser,
            ));
        }
        PluginRegistry::new(descriptors)
    }
}

/// Loads plugins from a YAML definitions file, or the built-in set when none is given.
#[derive(Debug, Clone, Default)]
pub struct DefinitionLoader {
    path: Option<PathBuf>,
}

impl DefinitionLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        DefinitionLoader { path }
    }
}

impl PluginLoader for DefinitionLoader {
    fn load(&self) -> Result<PluginRegistry> {
        let definitions = match &self.path {
            Some(path) => PluginDefinitions::from_yaml_file(path)?,
            None => PluginDefinitions::default_definitions(),
        };
        let registry = definitions
            .into_registry()
            .context("Failed to load plugins")?;
        info!("Loaded {} plugins", registry.len());
        Ok(registry)
    }
}
