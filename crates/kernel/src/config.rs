//! Configuration loaded from environment variables and `stampa.toml`.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::plugin::LoaderPaths;

/// Kernel configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site project root (default: current directory).
    pub project_root: PathBuf,

    /// Root directory of builtin plugins (default: `{root}/plugins`).
    pub plugins_dir: PathBuf,

    /// Root directory of installed plugin packages (default: `{root}/packages`).
    pub packages_dir: PathBuf,

    /// Persisted build state file (default: `{root}/.stampa-plugins.json`).
    pub state_file: PathBuf,
}

impl Config {
    /// Load configuration from `STAMPA_*` environment variables, falling
    /// back to defaults under the project root.
    pub fn from_env() -> Self {
        let project_root = env::var("STAMPA_PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let plugins_dir = env::var("STAMPA_PLUGINS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("plugins"));

        let packages_dir = env::var("STAMPA_PACKAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("packages"));

        let state_file = env::var("STAMPA_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join(".stampa-plugins.json"));

        Self {
            project_root,
            plugins_dir,
            packages_dir,
            state_file,
        }
    }

    /// The filesystem roots the plugin loader resolves against.
    pub fn loader_paths(&self) -> LoaderPaths {
        LoaderPaths {
            project_root: self.project_root.clone(),
            builtin_root: self.plugins_dir.clone(),
            packages_root: self.packages_dir.clone(),
        }
    }

    /// Path of the site configuration file.
    pub fn site_config_path(&self) -> PathBuf {
        self.project_root.join("stampa.toml")
    }
}

/// Site configuration parsed from `stampa.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteMeta,

    #[serde(default)]
    pub plugins: PluginSettings,
}

/// `[site]` metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteMeta {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub base_url: String,
}

/// `[plugins]` section: which plugins to enable and their user configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginSettings {
    /// Plugin names, package identifiers, or local paths to enable.
    #[serde(default)]
    pub enabled: Vec<String>,

    /// Per-plugin user configuration, merged over module defaults.
    #[serde(default)]
    pub config: HashMap<String, Map<String, Value>>,
}

impl SiteConfig {
    /// Load the site configuration. A missing file is an empty site.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read site config: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("failed to parse site config: {}", path.display()))
    }
}
