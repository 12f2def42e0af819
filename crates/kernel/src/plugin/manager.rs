//! Plugin lifecycle orchestration.
//!
//! The manager drives one build's plugin set: it diffs the previous build's
//! loaded plugins to run cleanup for anything removed, resolves a load order,
//! loads each plugin, registers hooks and shortcodes in that order, then
//! executes lifecycle hooks with per-handler error isolation until shutdown.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use stampa_sdk::hooks;
use stampa_sdk::types::ShortcodeCall;

use crate::config::PluginSettings;
use crate::hook::{HookRegistry, ShortcodeRegistry};

use super::error::PluginError;
use super::loader::{PluginInstance, PluginLoader};
use super::registry::RegistryAssembly;
use super::resolver::PluginResolver;
use super::state::{BuildState, StateStore};

/// Orchestrates plugin resolution, loading, registration, and hook execution
/// for one build at a time.
pub struct PluginManager {
    loader: PluginLoader,
    state_store: Box<dyn StateStore>,
    hooks: HookRegistry,
    shortcodes: ShortcodeRegistry,
    components: ShortcodeRegistry,
    plugins: HashMap<String, Arc<PluginInstance>>,
    load_order: Vec<String>,
    initialized: bool,
}

impl PluginManager {
    pub fn new(loader: PluginLoader, state_store: Box<dyn StateStore>) -> Self {
        Self {
            loader,
            state_store,
            hooks: HookRegistry::new(),
            shortcodes: ShortcodeRegistry::new("shortcode"),
            components: ShortcodeRegistry::new("component"),
            plugins: HashMap::new(),
            load_order: Vec::new(),
            initialized: false,
        }
    }

    /// Resolve, load, and register the enabled plugin set.
    ///
    /// Resolution failures (cycles, missing dependencies, unsatisfied
    /// capabilities, bad manifests) abort initialization; per-plugin load
    /// failures are logged and the plugin skipped. Calling this on an
    /// already-initialized manager is a warning no-op.
    pub async fn initialize(&mut self, settings: &PluginSettings) -> Result<(), PluginError> {
        if self.initialized {
            warn!("plugin manager already initialized, ignoring");
            return Ok(());
        }

        self.retire_removed_plugins(settings).await;

        let assembly = RegistryAssembly::build(self.loader.paths(), &settings.enabled)?;
        let resolver = PluginResolver::new(&assembly.registry);
        let order = resolver.resolve(&assembly.requested)?;
        debug!(order = ?order, "resolved plugin load order");

        for name in &order {
            // Plugins requested by path or scope load under the name they
            // were requested with.
            let load_name = assembly
                .aliases
                .get(name)
                .map(String::as_str)
                .unwrap_or(name);
            let user_config = settings
                .config
                .get(load_name)
                .or_else(|| settings.config.get(name));

            match self.loader.load(load_name, user_config) {
                Ok(instance) => {
                    if !instance.enabled {
                        info!(plugin = %name, "plugin disabled by configuration, skipping");
                        continue;
                    }
                    self.register_instance(&instance);
                    self.plugins
                        .insert(instance.name().to_string(), Arc::clone(&instance));
                    self.load_order.push(instance.name().to_string());
                }
                Err(e) => {
                    error!(plugin = %name, error = %e, "failed to load plugin, skipping");
                }
            }
        }

        let state = BuildState::now(self.load_order.clone());
        if let Err(e) = self.state_store.save(&state) {
            warn!(error = format!("{e:#}"), "failed to persist plugin state");
        }

        self.initialized = true;
        info!(
            plugins = self.load_order.len(),
            hooks = self.hooks.hook_count(),
            shortcodes = self.shortcodes.len(),
            "plugin manager initialized"
        );
        Ok(())
    }

    /// Run cleanup for plugins that were loaded last build but are no longer
    /// in the enabled set. Every failure here is logged and swallowed.
    async fn retire_removed_plugins(&mut self, settings: &PluginSettings) {
        let previous = match self.state_store.load() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = format!("{e:#}"), "failed to read previous build state");
                None
            }
        };
        let Some(previous) = previous else {
            return;
        };

        let current: HashSet<&str> = settings.enabled.iter().map(|s| s.trim()).collect();
        let removed: Vec<&String> = previous
            .loaded_plugins
            .iter()
            .filter(|name| !current.contains(name.as_str()))
            .collect();

        if removed.is_empty() {
            return;
        }

        let context = json!({
            "project_root": self.loader.paths().project_root.display().to_string(),
            "reason": "removed",
        });

        for name in removed {
            debug!(plugin = %name, "plugin removed from configuration, running cleanup");
            match self.loader.load(name, None) {
                Ok(instance) => {
                    if let Some(cleanup) = &instance.cleanup {
                        if let Err(e) = cleanup(context.clone()).await {
                            let err = PluginError::CleanupFailed {
                                plugin: name.clone(),
                                details: format!("{e:#}"),
                            };
                            warn!(plugin = %name, error = %err, "plugin cleanup failed");
                        }
                    }
                }
                Err(e) => {
                    warn!(plugin = %name, error = %e, "could not load removed plugin for cleanup");
                }
            }
        }

        // Instances loaded only for cleanup must not leak into this build.
        self.loader.clear_cache();
    }

    fn register_instance(&mut self, instance: &Arc<PluginInstance>) {
        let owner = instance.name();

        for (hook, handler) in &instance.hooks {
            self.hooks.register(hook, owner, Arc::clone(handler));
        }
        for (name, handler) in &instance.shortcodes {
            self.shortcodes.register(name, owner, Arc::clone(handler));
        }
        for (name, handler) in &instance.components {
            self.components.register(name, owner, Arc::clone(handler));
        }
    }

    /// Execute a lifecycle hook.
    ///
    /// `args[0]` is the running value; with no registered handlers it is
    /// returned unchanged. Handlers run sequentially in load order and each
    /// defined return value replaces the running value. Handler failures are
    /// logged with owner attribution and never abort the pipeline.
    pub async fn execute_hook(&self, name: &str, args: Vec<Value>) -> Value {
        if !hooks::is_known(name) {
            warn!(hook = %name, "executing unknown hook name");
        }

        let mut args = args.into_iter();
        let mut value = args.next().unwrap_or(Value::Null);
        let mut extra: Vec<Value> = args.collect();

        let handlers = self.hooks.handlers(name);
        if handlers.is_empty() {
            debug!(hook = %name, "no handlers registered");
            return value;
        }

        if name == hooks::CONFIG_LOADED {
            return self.execute_config_loaded(value, extra).await;
        }

        // Raw content invoked bare gets a default rendering context.
        if extra.is_empty() && value.is_string() {
            extra.push(Value::Object(Map::new()));
        }

        for registration in handlers {
            match (registration.handler)(value.clone(), extra.clone()).await {
                Ok(Some(next)) => value = next,
                Ok(None) => {}
                Err(e) => {
                    let err = PluginError::hook_failed(
                        registration.owner.as_str(),
                        name,
                        format!("{e:#}"),
                    );
                    error!(
                        plugin = %registration.owner,
                        hook = %name,
                        error = %err,
                        "hook handler failed, continuing"
                    );
                }
            }
        }

        value
    }

    /// The configuration hook does not thread a running value: every handler
    /// receives the global configuration plus its own resolved plugin
    /// configuration and the shared context.
    async fn execute_config_loaded(&self, global: Value, mut extra: Vec<Value>) -> Value {
        let context = if extra.is_empty() {
            Value::Object(Map::new())
        } else {
            extra.remove(0)
        };

        for registration in self.hooks.handlers(hooks::CONFIG_LOADED) {
            let own_config = self
                .plugins
                .get(&registration.owner)
                .map(|p| Value::Object(p.resolved_config.clone()))
                .unwrap_or(Value::Null);

            let call_args = vec![own_config, context.clone()];
            if let Err(e) = (registration.handler)(global.clone(), call_args).await {
                let err = PluginError::hook_failed(
                    registration.owner.as_str(),
                    hooks::CONFIG_LOADED,
                    format!("{e:#}"),
                );
                error!(
                    plugin = %registration.owner,
                    hook = hooks::CONFIG_LOADED,
                    error = %err,
                    "hook handler failed, continuing"
                );
            }
        }

        global
    }

    /// Render a shortcode. Returns `None` when the name is unregistered or
    /// the handler fails, so callers can fall back to the literal markup.
    pub async fn execute_shortcode(
        &self,
        name: &str,
        attrs: Map<String, Value>,
        content: Option<&str>,
        context: Value,
    ) -> Option<String> {
        Self::render(&self.shortcodes, name, attrs, content, context).await
    }

    /// Render a component, with the same miss and failure behavior as
    /// [`execute_shortcode`](Self::execute_shortcode).
    pub async fn execute_component(
        &self,
        name: &str,
        attrs: Map<String, Value>,
        content: Option<&str>,
        context: Value,
    ) -> Option<String> {
        Self::render(&self.components, name, attrs, content, context).await
    }

    async fn render(
        registry: &ShortcodeRegistry,
        name: &str,
        attrs: Map<String, Value>,
        content: Option<&str>,
        context: Value,
    ) -> Option<String> {
        let registration = registry.get(name)?;

        let call = ShortcodeCall {
            attrs,
            content: content.map(str::to_string),
            context,
        };

        match (registration.handler)(call).await {
            Ok(html) => Some(html),
            Err(e) => {
                error!(
                    plugin = %registration.owner,
                    name = %name,
                    error = format!("{e:#}"),
                    "shortcode handler failed"
                );
                None
            }
        }
    }

    /// Fire the terminal hook and clear all registries and the loader cache.
    /// Safe to call on a manager that was never initialized.
    pub async fn shutdown(&mut self) {
        self.execute_hook(hooks::SHUTDOWN, Vec::new()).await;

        self.hooks.clear();
        self.shortcodes.clear();
        self.components.clear();
        self.plugins.clear();
        self.load_order.clear();
        self.loader.clear_cache();
        self.initialized = false;

        info!("plugin manager shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Loaded plugin names in load order.
    pub fn plugin_names(&self) -> &[String] {
        &self.load_order
    }

    pub fn plugin(&self, name: &str) -> Option<Arc<PluginInstance>> {
        self.plugins.get(name).cloned()
    }

    pub fn plugin_count(&self) -> usize {
        self.load_order.len()
    }

    pub fn has_hook(&self, hook: &str) -> bool {
        self.hooks.has_hook(hook)
    }

    pub fn handler_count(&self, hook: &str) -> usize {
        self.hooks.handler_count(hook)
    }

    /// All hook names with at least one handler.
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.hook_names().collect()
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("initialized", &self.initialized)
            .field("plugins", &self.load_order)
            .field("hooks", &self.hooks.hook_count())
            .field("shortcodes", &self.shortcodes.len())
            .field("components", &self.components.len())
            .finish()
    }
}
