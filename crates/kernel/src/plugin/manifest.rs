//! Parser for plugin `.info.toml` manifest files.
//!
//! Each plugin ships a `{name}.info.toml` file that declares metadata:
//! - name, version, description
//! - required and optional dependencies (other plugins or capabilities)
//! - capabilities this plugin provides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::error::PluginError;

/// Manifest filename suffix shared by every plugin.
pub const MANIFEST_SUFFIX: &str = ".info.toml";

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Plugin machine name (unique across the registry).
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Dependency declarations.
    #[serde(default)]
    pub dependencies: DependencyDecl,

    /// Abstract capabilities this plugin satisfies (e.g., "syntax_highlight").
    #[serde(default)]
    pub provides: Vec<String>,
}

/// Required and optional dependency lists.
///
/// Required names must resolve to an installed plugin or to a capability with
/// at least one provider. Optional names are loaded only when installed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyDecl {
    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default)]
    pub optional: Vec<String>,
}

impl PluginManifest {
    /// Parse a plugin manifest from the given path.
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plugin manifest: {}", path.display()))?;

        Self::parse_str(&content, path)
    }

    /// Parse a plugin manifest from a TOML string.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let manifest: PluginManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse plugin manifest TOML at {}", path.display()))?;

        manifest.validate(path)?;
        Ok(manifest)
    }

    /// Validate the parsed manifest.
    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("plugin manifest at {} has empty 'name' field", path.display());
        }

        semver::Version::parse(&self.version).with_context(|| {
            format!(
                "plugin '{}' at {} has version '{}' which is not strict semver",
                self.name,
                path.display(),
                self.version
            )
        })?;

        for dep in self
            .dependencies
            .required
            .iter()
            .chain(self.dependencies.optional.iter())
        {
            if dep.trim().is_empty() {
                anyhow::bail!(
                    "plugin '{}' at {} declares an empty dependency name",
                    self.name,
                    path.display()
                );
            }
        }

        Ok(())
    }
}

/// Find the single `*.info.toml` file in a plugin directory.
///
/// Returns `Ok(None)` when the directory holds no manifest so callers can
/// treat the location as not applicable and move on.
pub fn locate_in_dir(dir: &Path) -> Result<Option<PathBuf>, PluginError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| PluginError::io(dir.display().to_string(), e))?;

    let manifests: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX))
        })
        .collect();

    match manifests.len() {
        0 => Ok(None),
        1 => Ok(Some(manifests.into_iter().next().unwrap_or_default())),
        _ => Err(PluginError::MultipleManifests {
            path: dir.display().to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_manifest() {
        let toml = r#"
name = "search"
description = "Builds the client-side search index"
version = "1.2.0"
provides = ["search_index"]

[dependencies]
required = ["markdown"]
optional = ["analytics"]
"#;

        let manifest = PluginManifest::parse_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(manifest.name, "search");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.dependencies.required, vec!["markdown"]);
        assert_eq!(manifest.dependencies.optional, vec!["analytics"]);
        assert_eq!(manifest.provides, vec!["search_index"]);
    }

    #[test]
    fn parse_minimal_manifest() {
        let toml = r#"
name = "minimal"
version = "0.1.0"
"#;

        let manifest = PluginManifest::parse_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(manifest.name, "minimal");
        assert!(manifest.description.is_empty());
        assert!(manifest.dependencies.required.is_empty());
        assert!(manifest.dependencies.optional.is_empty());
        assert!(manifest.provides.is_empty());
    }

    #[test]
    fn reject_empty_name() {
        let toml = r#"
name = ""
version = "1.0.0"
"#;

        let result = PluginManifest::parse_str(toml, Path::new("test.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty 'name'"));
    }

    #[test]
    fn reject_loose_version() {
        let toml = r#"
name = "loose"
version = "1.0"
"#;

        let result = PluginManifest::parse_str(toml, Path::new("test.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("strict semver"));
    }

    #[test]
    fn reject_empty_dependency_name() {
        let toml = r#"
name = "broken"
version = "1.0.0"

[dependencies]
required = [""]
"#;

        let result = PluginManifest::parse_str(toml, Path::new("test.toml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("empty dependency name")
        );
    }

    #[test]
    fn locate_single_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.info.toml"), "name = \"alpha\"").unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();

        let found = locate_in_dir(dir.path()).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn locate_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]").unwrap();

        assert!(locate_in_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn locate_multiple_manifests_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.info.toml"), "name = \"a\"").unwrap();
        std::fs::write(dir.path().join("b.info.toml"), "name = \"b\"").unwrap();

        let result = locate_in_dir(dir.path());
        assert!(matches!(
            result,
            Err(PluginError::MultipleManifests { .. })
        ));
    }
}
