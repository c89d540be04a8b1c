//! Configuration loaded from `datefmt.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::DateFmtResult;
use crate::function::FunctionNames;

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "datefmt.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra function names parsed as `DATE_FORMAT()`.
    pub functions: Vec<String>,

    pub sqlite: SqliteConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Connection URL, e.g. `sqlite://app.db` or `sqlite::memory:`.
    pub url: Option<String>,

    pub max_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn from_toml_str(content: &str) -> DateFmtResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> DateFmtResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the first config file found, or the defaults.
    pub fn load() -> DateFmtResult<Self> {
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// `./datefmt.toml`, then `<config dir>/datefmt/datefmt.toml`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("datefmt").join(CONFIG_FILE));
        }
        paths
    }

    /// `DATE_FORMAT` plus the configured aliases.
    pub fn function_names(&self) -> FunctionNames {
        let mut names = FunctionNames::default();
        for name in &self.functions {
            names.register(name);
        }
        names
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Register an extra `DATE_FORMAT()` alias.
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.config.functions.push(name.into());
        self
    }

    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.sqlite.url = Some(url.into());
        self
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.config.sqlite.max_connections = n;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
