//! Plugin loading strategies and the instance cache.
//!
//! A plugin name is resolved by trying a fixed list of sources in priority
//! order: builtin plugins, conventionally named packages, scoped packages,
//! and local paths. Each strategy either locates the plugin or reports "not
//! applicable" so the next one can try; any other failure propagates.
//!
//! Behavior (hooks, shortcodes, cleanup) comes from a [`ModuleRegistry`] of
//! in-process module factories rather than dynamic code loading. A located
//! manifest without a registered module yields a declarative instance with
//! empty handler maps.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use stampa_sdk::types::{CleanupFn, HookFn, PluginModule, ShortcodeFn};

use super::error::PluginError;
use super::manifest::{self, PluginManifest};

/// Prefix for external plugin packages discovered by convention.
pub const PACKAGE_PREFIX: &str = "stampa-plugin-";

/// Which source a plugin instance was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSource {
    Builtin,
    Package,
    ScopedPackage,
    LocalPath,
}

impl fmt::Display for PluginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Builtin => "builtin",
            Self::Package => "package",
            Self::ScopedPackage => "scoped-package",
            Self::LocalPath => "local-path",
        };
        f.write_str(name)
    }
}

/// Strip characters that could redirect a builtin lookup outside its root:
/// whitespace, path separators, and parent-directory sequences.
pub(crate) fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/' && *c != '\\')
        .collect();
    cleaned.replace("..", "")
}

/// A name like `@scope/package`.
pub(crate) fn is_scoped_name(name: &str) -> bool {
    name.starts_with('@') && name.contains('/')
}

/// A name that should be treated as a filesystem path.
pub(crate) fn is_path_like(name: &str) -> bool {
    name.contains('/') || name.contains('\\') || Path::new(name).is_absolute()
}

/// Filesystem roots the loading strategies resolve against.
#[derive(Debug, Clone)]
pub struct LoaderPaths {
    /// Site project root; local-path plugins resolve relative to this.
    pub project_root: PathBuf,
    /// Root directory of builtin plugins.
    pub builtin_root: PathBuf,
    /// Root directory of installed plugin packages.
    pub packages_root: PathBuf,
}

/// Registry of in-process plugin module factories.
///
/// Builtin plugins register their factories at startup; embedders register
/// factories for any plugin packages linked into the binary.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, Arc<dyn Fn() -> PluginModule + Send + Sync>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module factory under a plugin name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> PluginModule + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .factories
            .insert(name.clone(), Arc::new(factory))
            .is_some()
        {
            warn!(plugin = %name, "module factory replaced an earlier registration");
        }
    }

    /// Check whether a factory is registered for a name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn instantiate(&self, name: &str) -> Option<PluginModule> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("plugins", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A loaded plugin: manifest metadata plus module behavior and merged config.
pub struct PluginInstance {
    /// Manifest metadata.
    pub manifest: PluginManifest,
    /// Which strategy produced this instance.
    pub source: PluginSource,
    /// False when user configuration sets `enabled = false`.
    pub enabled: bool,
    /// Hook handlers keyed by hook name.
    pub hooks: HashMap<String, HookFn>,
    /// Shortcode renderers keyed by tag name.
    pub shortcodes: HashMap<String, ShortcodeFn>,
    /// Component renderers keyed by tag name.
    pub components: HashMap<String, ShortcodeFn>,
    /// Static assets directory, if the module declares one.
    pub assets: Option<PathBuf>,
    /// Module default configuration.
    pub default_config: Map<String, Value>,
    /// User configuration as given.
    pub user_config: Map<String, Value>,
    /// Defaults overlaid with user configuration (user wins per key).
    pub resolved_config: Map<String, Value>,
    /// Invoked when the plugin is removed from the enabled set.
    pub cleanup: Option<CleanupFn>,
}

impl PluginInstance {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.manifest.name)
            .field("version", &self.manifest.version)
            .field("source", &self.source)
            .field("enabled", &self.enabled)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("shortcodes", &self.shortcodes.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A manifest located on disk by one of the strategies.
#[derive(Debug, Clone)]
pub struct LocatedPlugin {
    pub dir: PathBuf,
    pub manifest_path: PathBuf,
    pub source: PluginSource,
}

trait LoadStrategy: Send + Sync {
    fn source(&self) -> PluginSource;

    /// Locate the plugin, returning `Ok(None)` when this strategy does not
    /// apply to the name.
    fn locate(
        &self,
        name: &str,
        paths: &LoaderPaths,
        modules: &ModuleRegistry,
    ) -> Result<Option<LocatedPlugin>, PluginError>;
}

struct BuiltinStrategy;

impl LoadStrategy for BuiltinStrategy {
    fn source(&self) -> PluginSource {
        PluginSource::Builtin
    }

    fn locate(
        &self,
        name: &str,
        paths: &LoaderPaths,
        modules: &ModuleRegistry,
    ) -> Result<Option<LocatedPlugin>, PluginError> {
        let clean = sanitize_name(name);
        if clean.is_empty() {
            return Ok(None);
        }

        let Ok(root) = paths.builtin_root.canonicalize() else {
            return Ok(None);
        };

        let dir = root.join(&clean);
        if !dir.is_dir() {
            return Ok(None);
        }

        // Traversal defense even after sanitization: the canonical directory
        // must remain inside the canonical builtin root.
        let canonical = dir
            .canonicalize()
            .map_err(|e| PluginError::io(clean.clone(), e))?;
        if !canonical.starts_with(&root) {
            return Err(PluginError::UnsafePath {
                plugin: name.to_string(),
                path: canonical.display().to_string(),
            });
        }

        let Some(manifest_path) = manifest::locate_in_dir(&canonical)? else {
            return Ok(None);
        };

        // Builtins require the entry module alongside the manifest.
        if !modules.contains(&clean) {
            return Ok(None);
        }

        Ok(Some(LocatedPlugin {
            dir: canonical,
            manifest_path,
            source: PluginSource::Builtin,
        }))
    }
}

struct PackageStrategy;

impl LoadStrategy for PackageStrategy {
    fn source(&self) -> PluginSource {
        PluginSource::Package
    }

    fn locate(
        &self,
        name: &str,
        paths: &LoaderPaths,
        _modules: &ModuleRegistry,
    ) -> Result<Option<LocatedPlugin>, PluginError> {
        let dir = paths.packages_root.join(format!("{PACKAGE_PREFIX}{name}"));
        if !dir.is_dir() {
            return Ok(None);
        }

        match manifest::locate_in_dir(&dir)? {
            Some(manifest_path) => Ok(Some(LocatedPlugin {
                dir,
                manifest_path,
                source: PluginSource::Package,
            })),
            None => Err(PluginError::MissingManifest {
                plugin: name.to_string(),
                path: dir.display().to_string(),
            }),
        }
    }
}

struct ScopedPackageStrategy;

impl LoadStrategy for ScopedPackageStrategy {
    fn source(&self) -> PluginSource {
        PluginSource::ScopedPackage
    }

    fn locate(
        &self,
        name: &str,
        paths: &LoaderPaths,
        _modules: &ModuleRegistry,
    ) -> Result<Option<LocatedPlugin>, PluginError> {
        if !is_scoped_name(name) {
            return Ok(None);
        }

        let dir = paths.packages_root.join(name);
        if !dir.is_dir() {
            return Ok(None);
        }

        match manifest::locate_in_dir(&dir)? {
            Some(manifest_path) => Ok(Some(LocatedPlugin {
                dir,
                manifest_path,
                source: PluginSource::ScopedPackage,
            })),
            None => Err(PluginError::MissingManifest {
                plugin: name.to_string(),
                path: dir.display().to_string(),
            }),
        }
    }
}

struct LocalPathStrategy;

impl LoadStrategy for LocalPathStrategy {
    fn source(&self) -> PluginSource {
        PluginSource::LocalPath
    }

    fn locate(
        &self,
        name: &str,
        paths: &LoaderPaths,
        _modules: &ModuleRegistry,
    ) -> Result<Option<LocatedPlugin>, PluginError> {
        if !is_path_like(name) {
            return Ok(None);
        }

        let candidate = Path::new(name);
        let dir = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            paths.project_root.join(candidate)
        };
        if !dir.is_dir() {
            return Ok(None);
        }

        match manifest::locate_in_dir(&dir)? {
            Some(manifest_path) => Ok(Some(LocatedPlugin {
                dir,
                manifest_path,
                source: PluginSource::LocalPath,
            })),
            None => Err(PluginError::MissingManifest {
                plugin: name.to_string(),
                path: dir.display().to_string(),
            }),
        }
    }
}

/// Loads plugin instances through the strategy chain and caches them.
pub struct PluginLoader {
    paths: LoaderPaths,
    modules: ModuleRegistry,
    strategies: Vec<Box<dyn LoadStrategy>>,
    cache: HashMap<String, Arc<PluginInstance>>,
}

impl PluginLoader {
    /// Create a loader with the standard strategy chain.
    pub fn new(paths: LoaderPaths, modules: ModuleRegistry) -> Self {
        Self {
            paths,
            modules,
            strategies: vec![
                Box::new(BuiltinStrategy),
                Box::new(PackageStrategy),
                Box::new(ScopedPackageStrategy),
                Box::new(LocalPathStrategy),
            ],
            cache: HashMap::new(),
        }
    }

    pub fn paths(&self) -> &LoaderPaths {
        &self.paths
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Locate a plugin's manifest without building an instance.
    pub fn locate_manifest(&self, name: &str) -> Result<Option<LocatedPlugin>, PluginError> {
        for strategy in &self.strategies {
            if let Some(located) = strategy.locate(name, &self.paths, &self.modules)? {
                return Ok(Some(located));
            }
        }
        Ok(None)
    }

    /// Load a plugin by name, merging user configuration into its defaults.
    ///
    /// Successful loads are cached by trimmed name; repeated calls return the
    /// identical instance until [`clear_cache`](Self::clear_cache).
    pub fn load(
        &mut self,
        name: &str,
        user_config: Option<&Map<String, Value>>,
    ) -> Result<Arc<PluginInstance>, PluginError> {
        let key = name.trim().to_string();

        if let Some(hit) = self.cache.get(&key) {
            debug!(plugin = %key, "plugin served from cache");
            return Ok(Arc::clone(hit));
        }

        let mut tried = Vec::with_capacity(self.strategies.len());
        let mut located = None;
        for strategy in &self.strategies {
            match strategy.locate(&key, &self.paths, &self.modules)? {
                Some(found) => {
                    located = Some(found);
                    break;
                }
                None => tried.push(strategy.source().to_string()),
            }
        }

        let Some(located) = located else {
            return Err(PluginError::not_found(key, &tried));
        };

        debug!(
            plugin = %key,
            source = %located.source,
            dir = %located.dir.display(),
            "located plugin"
        );

        let instance = Arc::new(self.build_instance(&key, &located, user_config)?);
        self.cache.insert(key, Arc::clone(&instance));
        Ok(instance)
    }

    fn build_instance(
        &self,
        requested: &str,
        located: &LocatedPlugin,
        user_config: Option<&Map<String, Value>>,
    ) -> Result<PluginInstance, PluginError> {
        let manifest =
            PluginManifest::parse(&located.manifest_path).map_err(|e| PluginError::InvalidManifest {
                plugin: requested.to_string(),
                details: format!("{e:#}"),
            })?;

        let module = self.modules.instantiate(&manifest.name);

        if located.source == PluginSource::Builtin && module.is_none() {
            return Err(PluginError::invalid_plugin(
                &manifest.name,
                "builtin module is registered under a name that does not match its manifest",
            ));
        }

        if let Some(module) = &module {
            if module.name != manifest.name {
                return Err(PluginError::invalid_plugin(
                    &manifest.name,
                    format!(
                        "module name '{}' does not match manifest name '{}'",
                        module.name, manifest.name
                    ),
                ));
            }
            if semver::Version::parse(&module.version).is_err() {
                return Err(PluginError::invalid_plugin(
                    &manifest.name,
                    format!("module version '{}' is not strict semver", module.version),
                ));
            }
            if module.version != manifest.version {
                warn!(
                    plugin = %manifest.name,
                    manifest_version = %manifest.version,
                    module_version = %module.version,
                    "module and manifest versions differ"
                );
            }
        }

        // No registered module means a declarative, manifest-only plugin.
        let module = module.unwrap_or_default();

        let default_config = module.config;
        let mut resolved_config = default_config.clone();
        if let Some(user) = user_config {
            for (key, value) in user {
                resolved_config.insert(key.clone(), value.clone());
            }
        }

        let enabled = user_config
            .and_then(|c| c.get("enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(true);

        Ok(PluginInstance {
            manifest,
            source: located.source,
            enabled,
            hooks: module.hooks,
            shortcodes: module.shortcodes,
            components: module.components,
            assets: module.assets,
            default_config,
            user_config: user_config.cloned().unwrap_or_default(),
            resolved_config,
            cleanup: module.cleanup,
        })
    }

    /// Drop every cached instance. The next `load` rebuilds from disk.
    pub fn clear_cache(&mut self) {
        let dropped = self.cache.len();
        self.cache.clear();
        debug!(dropped, "plugin cache cleared");
    }

    /// Number of cached instances.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLoader")
            .field("paths", &self.paths)
            .field("modules", &self.modules)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use stampa_sdk::types::sync_hook_fn;

    fn manifest_body(name: &str, version: &str) -> String {
        format!("name = \"{name}\"\nversion = \"{version}\"\n")
    }

    fn write_plugin_dir(base: &Path, rel_dir: &str, manifest: &str) {
        let dir = base.join(rel_dir);
        std::fs::create_dir_all(&dir).unwrap();
        let file_stem = rel_dir.rsplit('/').next().unwrap();
        std::fs::write(dir.join(format!("{file_stem}.info.toml")), manifest).unwrap();
    }

    fn loader_paths(root: &Path) -> LoaderPaths {
        LoaderPaths {
            project_root: root.to_path_buf(),
            builtin_root: root.join("plugins"),
            packages_root: root.join("packages"),
        }
    }

    fn alpha_module() -> PluginModule {
        PluginModule::new("alpha", "1.0.0")
            .with_hook("build_start", sync_hook_fn(|value, _| Ok(Some(value))))
    }

    #[test]
    fn builtin_load_with_module() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut modules = ModuleRegistry::new();
        modules.register("alpha", alpha_module);

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);
        let instance = loader.load("alpha", None).unwrap();

        assert_eq!(instance.name(), "alpha");
        assert_eq!(instance.source, PluginSource::Builtin);
        assert!(instance.enabled);
        assert_eq!(instance.hooks.len(), 1);
    }

    #[test]
    fn repeated_loads_share_the_cached_instance() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut modules = ModuleRegistry::new();
        modules.register("alpha", alpha_module);

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);
        let first = loader.load("alpha", None).unwrap();
        let second = loader.load("alpha", None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        loader.clear_cache();
        let third = loader.load("alpha", None).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn builtin_without_module_is_not_applicable() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let err = loader.load("alpha", None).unwrap_err();

        match err {
            PluginError::NotFound { tried, .. } => {
                assert!(tried.contains("builtin"));
                assert!(tried.contains("package"));
                assert!(tried.contains("local-path"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn package_by_convention() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(
            tmp.path(),
            "packages/stampa-plugin-beta",
            &manifest_body("beta", "0.3.1"),
        );

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let instance = loader.load("beta", None).unwrap();

        assert_eq!(instance.source, PluginSource::Package);
        assert!(instance.hooks.is_empty());
        assert!(instance.enabled);
    }

    #[test]
    fn scoped_package() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(
            tmp.path(),
            "packages/@acme/gamma",
            &manifest_body("gamma", "2.0.0"),
        );

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let instance = loader.load("@acme/gamma", None).unwrap();

        assert_eq!(instance.source, PluginSource::ScopedPackage);
        assert_eq!(instance.name(), "gamma");
    }

    #[test]
    fn local_path_plugin() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(
            tmp.path(),
            "site-plugins/delta",
            &manifest_body("delta", "0.1.0"),
        );

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let instance = loader.load("site-plugins/delta", None).unwrap();

        assert_eq!(instance.source, PluginSource::LocalPath);
        assert_eq!(instance.name(), "delta");
    }

    #[test]
    fn traversal_names_cannot_escape_the_builtin_root() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut modules = ModuleRegistry::new();
        modules.register("alpha", alpha_module);

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);

        // Sanitization collapses the traversal onto the plain name.
        let instance = loader.load("../alpha", None).unwrap();
        assert_eq!(instance.source, PluginSource::Builtin);

        // Traversal towards a directory that holds no plugin finds nothing.
        let err = loader.load("../outside", None).unwrap_err();
        assert!(matches!(err, PluginError::NotFound { .. }));
    }

    #[test]
    fn sanitize_strips_separators_and_parent_dirs() {
        assert_eq!(sanitize_name("../evil"), "evil");
        assert_eq!(sanitize_name("a/b"), "ab");
        assert_eq!(sanitize_name(" spa ced "), "spaced");
        assert_eq!(sanitize_name("..\\..\\x"), "x");
        assert_eq!(sanitize_name("../.."), "");
    }

    #[test]
    fn name_shape_helpers() {
        assert!(is_scoped_name("@acme/gamma"));
        assert!(!is_scoped_name("gamma"));
        assert!(is_path_like("site-plugins/delta"));
        assert!(is_path_like("/abs/path"));
        assert!(!is_path_like("delta"));
    }

    #[test]
    fn user_config_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut modules = ModuleRegistry::new();
        modules.register("alpha", || {
            alpha_module()
                .with_config("depth", json!(2))
                .with_config("style", json!("plain"))
        });

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);

        let mut user = Map::new();
        user.insert("style".to_string(), json!("fancy"));
        let instance = loader.load("alpha", Some(&user)).unwrap();

        assert_eq!(instance.resolved_config.get("depth"), Some(&json!(2)));
        assert_eq!(instance.resolved_config.get("style"), Some(&json!("fancy")));
        assert_eq!(instance.default_config.get("style"), Some(&json!("plain")));
    }

    #[test]
    fn enabled_false_in_user_config() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(tmp.path(), "plugins/alpha", &manifest_body("alpha", "1.0.0"));

        let mut modules = ModuleRegistry::new();
        modules.register("alpha", alpha_module);

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);

        let mut user = Map::new();
        user.insert("enabled".to_string(), json!(false));
        let instance = loader.load("alpha", Some(&user)).unwrap();

        assert!(!instance.enabled);
    }

    #[test]
    fn package_dir_without_manifest_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("packages/stampa-plugin-empty")).unwrap();

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let err = loader.load("empty", None).unwrap_err();

        assert!(matches!(err, PluginError::MissingManifest { .. }));
    }

    #[test]
    fn loose_version_is_an_invalid_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(
            tmp.path(),
            "packages/stampa-plugin-loose",
            &manifest_body("loose", "1.0"),
        );

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let err = loader.load("loose", None).unwrap_err();

        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }

    #[test]
    fn module_name_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        write_plugin_dir(
            tmp.path(),
            "packages/stampa-plugin-beta",
            &manifest_body("beta", "0.3.1"),
        );

        let mut modules = ModuleRegistry::new();
        modules.register("beta", || PluginModule::new("other", "0.3.1"));

        let mut loader = PluginLoader::new(loader_paths(tmp.path()), modules);
        let err = loader.load("beta", None).unwrap_err();

        assert!(matches!(err, PluginError::InvalidPlugin { .. }));
    }

    #[test]
    fn not_found_lists_every_source_tried() {
        let tmp = tempfile::tempdir().unwrap();
        let mut loader = PluginLoader::new(loader_paths(tmp.path()), ModuleRegistry::new());
        let err = loader.load("ghost", None).unwrap_err();

        assert_eq!(
            err.to_string(),
            "plugin 'ghost': not found (sources tried: builtin, package, scoped-package, local-path)"
        );
    }
}
