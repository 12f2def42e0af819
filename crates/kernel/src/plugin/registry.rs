//! Descriptor registry: which plugins are installed and what they declare.
//!
//! Discovery scans plugin roots for directories holding a `*.info.toml`
//! manifest, sorted by directory name so enumeration order is deterministic.
//! The registry preserves insertion order, which makes capability provider
//! selection reproducible across builds.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use super::error::PluginError;
use super::loader::{LoaderPaths, is_path_like, is_scoped_name};
use super::manifest::{self, PluginManifest};

/// Ordered set of plugin manifests keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    by_name: HashMap<String, PluginManifest>,
    order: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a manifest, keeping the first registration on name collision.
    pub fn insert(&mut self, manifest: PluginManifest) {
        if self.by_name.contains_key(&manifest.name) {
            warn!(
                plugin = %manifest.name,
                "duplicate plugin manifest ignored, keeping the first discovered"
            );
            return;
        }
        self.order.push(manifest.name.clone());
        self.by_name.insert(manifest.name.clone(), manifest);
    }

    pub fn get(&self, name: &str) -> Option<&PluginManifest> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Plugin names in enumeration (insertion) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All plugins providing a capability, in enumeration order.
    pub fn providers_of(&self, capability: &str) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| {
                self.by_name
                    .get(*name)
                    .is_some_and(|m| m.provides.iter().any(|p| p == capability))
            })
            .map(String::as_str)
            .collect()
    }

    /// Scan plugin roots for manifests.
    ///
    /// Each immediate subdirectory holding exactly one `*.info.toml` becomes
    /// a registry entry. Directories are visited in sorted order; unreadable
    /// or invalid entries warn and are skipped.
    pub fn discover(roots: &[impl AsRef<Path>]) -> Self {
        let mut registry = Self::new();

        for root in roots {
            let root = root.as_ref();
            if !root.exists() {
                debug!(root = %root.display(), "plugin root does not exist, skipping");
                continue;
            }

            let entries = match std::fs::read_dir(root) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "failed to read plugin root");
                    continue;
                }
            };

            let mut dirs: Vec<_> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .collect();
            dirs.sort_by_key(|e| e.file_name());

            for entry in dirs {
                let plugin_dir = entry.path();

                let manifest_path = match manifest::locate_in_dir(&plugin_dir) {
                    Ok(Some(path)) => path,
                    Ok(None) => {
                        debug!(dir = %plugin_dir.display(), "no manifest found, skipping");
                        continue;
                    }
                    Err(e) => {
                        warn!(dir = %plugin_dir.display(), error = %e, "skipping plugin directory");
                        continue;
                    }
                };

                match PluginManifest::parse(&manifest_path) {
                    Ok(parsed) => registry.insert(parsed),
                    Err(e) => {
                        warn!(
                            path = %manifest_path.display(),
                            error = format!("{e:#}"),
                            "failed to parse plugin manifest, excluding from registry"
                        );
                    }
                }
            }
        }

        info!(count = registry.len(), "discovered plugins");
        registry
    }
}

/// A registry assembled for a concrete build request: discovered manifests
/// plus any scoped-package or local-path plugins named in the enabled set.
#[derive(Debug, Clone)]
pub struct RegistryAssembly {
    /// All known manifests, enumeration order preserved.
    pub registry: PluginRegistry,
    /// The requested names translated to manifest names where possible.
    pub requested: Vec<String>,
    /// Manifest name to the originally requested name, for plugins that were
    /// requested by path or scoped package identifier.
    pub aliases: HashMap<String, String>,
}

impl RegistryAssembly {
    /// Discover plugins under the given roots and fold the enabled set in.
    ///
    /// Scoped and path-like names are resolved to their manifests up front so
    /// the resolver can see their dependency declarations; a bad manifest is
    /// fatal here, while a missing one is left for the resolver to report.
    pub fn build(paths: &LoaderPaths, enabled: &[String]) -> Result<Self, PluginError> {
        let mut registry =
            PluginRegistry::discover(&[&paths.builtin_root, &paths.packages_root]);
        let mut requested = Vec::with_capacity(enabled.len());
        let mut aliases = HashMap::new();

        for name in enabled {
            let trimmed = name.trim();

            let dir = if is_scoped_name(trimmed) {
                Some(paths.packages_root.join(trimmed))
            } else if is_path_like(trimmed) {
                let candidate = Path::new(trimmed);
                if candidate.is_absolute() {
                    Some(candidate.to_path_buf())
                } else {
                    Some(paths.project_root.join(candidate))
                }
            } else {
                None
            };

            if let Some(dir) = dir
                && dir.is_dir()
                && let Some(manifest_path) = manifest::locate_in_dir(&dir)?
            {
                let parsed = PluginManifest::parse(&manifest_path).map_err(|e| {
                    PluginError::InvalidManifest {
                        plugin: trimmed.to_string(),
                        details: format!("{e:#}"),
                    }
                })?;
                aliases.insert(parsed.name.clone(), trimmed.to_string());
                requested.push(parsed.name.clone());
                registry.insert(parsed);
                continue;
            }

            requested.push(trimmed.to_string());
        }

        Ok(Self {
            registry,
            requested,
            aliases,
        })
    }
}
