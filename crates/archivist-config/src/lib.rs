//! Configuration management for Archivist
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`ARCHIVIST_*` prefix, highest precedence)
//! 2. archivist.local.toml (gitignored, local overrides)
//! 3. archivist.toml (git-tracked, project config)
//! 4. ~/.config/archivist/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Archivist configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivistConfig {
    pub project: ProjectConfig,
    pub catalog: CatalogSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "archivist-catalog".to_string(),
        }
    }
}

/// Where the catalog lives and how hard it tries to keep it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub data_dir: PathBuf,
    /// Sync the log to disk after every committed batch.
    pub fsync: bool,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".archivist/data"),
            fsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directives, e.g. `info` or `archivist=debug`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ArchivistConfig {
    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Create a development configuration
    pub fn development() -> Self {
        Self {
            catalog: CatalogSection {
                fsync: false,
                ..Default::default()
            },
            logging: LoggingConfig {
                filter: "debug".to_string(),
            },
            ..Default::default()
        }
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.catalog.data_dir.is_relative() {
            self.catalog.data_dir = base.join(&self.catalog.data_dir);
        }
    }

    /// Renders the configuration as `archivist.toml` content.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}
