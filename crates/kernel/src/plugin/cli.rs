//! CLI command implementations for plugin inspection.
//!
//! These commands operate with a minimal context (manifests on disk only),
//! without instantiating plugin modules or running a build.

use anyhow::Result;

use crate::config::{Config, SiteConfig};

use super::registry::RegistryAssembly;
use super::resolver::PluginResolver;

/// List all discovered plugins with their metadata.
pub fn cmd_plugin_list(config: &Config, site: &SiteConfig) -> Result<()> {
    let assembly = RegistryAssembly::build(&config.loader_paths(), &site.plugins.enabled)?;

    if assembly.registry.is_empty() {
        println!("No plugins found.");
        return Ok(());
    }

    let requested: std::collections::HashSet<&str> =
        assembly.requested.iter().map(String::as_str).collect();

    println!(
        "{:<20} {:<12} {:<9} {:<24} {}",
        "PLUGIN", "VERSION", "ENABLED", "PROVIDES", "REQUIRES"
    );
    println!("{}", "-".repeat(88));

    for name in assembly.registry.names() {
        let Some(manifest) = assembly.registry.get(name) else {
            continue;
        };

        let enabled = if requested.contains(name) { "yes" } else { "no" };
        let provides = manifest.provides.join(", ");
        let requires = manifest.dependencies.required.join(", ");

        println!(
            "{:<20} {:<12} {:<9} {:<24} {}",
            name, manifest.version, enabled, provides, requires
        );
    }

    Ok(())
}

/// Print the resolved load order for the enabled plugin set.
pub fn cmd_plugin_order(config: &Config, site: &SiteConfig) -> Result<()> {
    let assembly = RegistryAssembly::build(&config.loader_paths(), &site.plugins.enabled)?;

    if assembly.requested.is_empty() {
        println!("No plugins enabled.");
        return Ok(());
    }

    let resolver = PluginResolver::new(&assembly.registry);
    let order = resolver.resolve(&assembly.requested)?;

    for (index, name) in order.iter().enumerate() {
        match assembly.aliases.get(name) {
            Some(alias) => println!("{:>3}. {name} (from '{alias}')", index + 1),
            None => println!("{:>3}. {name}", index + 1),
        }
    }

    Ok(())
}

/// Validate the enabled plugin set. Returns whether it is valid.
pub fn cmd_plugin_validate(config: &Config, site: &SiteConfig) -> Result<bool> {
    let assembly = RegistryAssembly::build(&config.loader_paths(), &site.plugins.enabled)?;

    let resolver = PluginResolver::new(&assembly.registry);
    let report = resolver.validate(&assembly.requested);

    for error in &report.errors {
        println!("error: {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    if report.valid {
        println!(
            "{} plugin(s) enabled, configuration is valid.",
            assembly.requested.len()
        );
    } else {
        println!(
            "Configuration is invalid: {} error(s), {} warning(s).",
            report.errors.len(),
            report.warnings.len()
        );
    }

    Ok(report.valid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::PluginSettings;
    use std::path::Path;

    fn write_builtin(root: &Path, name: &str, body: &str) {
        let dir = root.join("plugins").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{name}.info.toml")), body).unwrap();
    }

    fn config_for(root: &Path) -> Config {
        Config {
            project_root: root.to_path_buf(),
            plugins_dir: root.join("plugins"),
            packages_dir: root.join("packages"),
            state_file: root.join(".stampa-plugins.json"),
        }
    }

    fn site_with(enabled: &[&str]) -> SiteConfig {
        SiteConfig {
            site: Default::default(),
            plugins: PluginSettings {
                enabled: enabled.iter().map(|s| s.to_string()).collect(),
                config: Default::default(),
            },
        }
    }

    #[test]
    fn validate_reports_a_healthy_set() {
        let tmp = tempfile::tempdir().unwrap();
        write_builtin(tmp.path(), "alpha", "name = \"alpha\"\nversion = \"1.0.0\"\n");

        let valid =
            cmd_plugin_validate(&config_for(tmp.path()), &site_with(&["alpha"])).unwrap();
        assert!(valid);
    }

    #[test]
    fn validate_reports_a_missing_dependency() {
        let tmp = tempfile::tempdir().unwrap();
        write_builtin(
            tmp.path(),
            "alpha",
            "name = \"alpha\"\nversion = \"1.0.0\"\n\n[dependencies]\nrequired = [\"missing_cap\"]\n",
        );

        let valid =
            cmd_plugin_validate(&config_for(tmp.path()), &site_with(&["alpha"])).unwrap();
        assert!(!valid);
    }

    #[test]
    fn order_and_list_run_on_an_empty_project() {
        let tmp = tempfile::tempdir().unwrap();
        cmd_plugin_list(&config_for(tmp.path()), &site_with(&[])).unwrap();
        cmd_plugin_order(&config_for(tmp.path()), &site_with(&[])).unwrap();
    }

    #[test]
    fn order_fails_on_cycles() {
        let tmp = tempfile::tempdir().unwrap();
        write_builtin(
            tmp.path(),
            "ping",
            "name = \"ping\"\nversion = \"1.0.0\"\n\n[dependencies]\nrequired = [\"pong\"]\n",
        );
        write_builtin(
            tmp.path(),
            "pong",
            "name = \"pong\"\nversion = \"1.0.0\"\n\n[dependencies]\nrequired = [\"ping\"]\n",
        );

        let result = cmd_plugin_order(&config_for(tmp.path()), &site_with(&["ping"]));
        assert!(result.is_err());
    }
}
