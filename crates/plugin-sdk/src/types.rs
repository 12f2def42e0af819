//! The plugin module contract.
//!
//! A [`PluginModule`] is the runtime behavior of a plugin: hook handlers keyed
//! by hook name, shortcode and component renderers keyed by tag name, default
//! configuration, and an optional cleanup callback. Handlers are async and
//! the kernel awaits each one fully before invoking the next.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures_core::future::BoxFuture;
use serde_json::{Map, Value};

/// A lifecycle hook handler.
///
/// Receives the current running value and any additional fixed arguments.
/// Returning `Some(value)` replaces the running value for the next handler;
/// returning `None` retains it.
pub type HookFn =
    Arc<dyn Fn(Value, Vec<Value>) -> BoxFuture<'static, Result<Option<Value>>> + Send + Sync>;

/// A shortcode or component renderer. Produces the replacement markup.
pub type ShortcodeFn =
    Arc<dyn Fn(ShortcodeCall) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// Cleanup callback invoked when a previously enabled plugin is removed
/// from the configuration. Receives a context object describing the project.
pub type CleanupFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// A single shortcode or component invocation.
#[derive(Debug, Clone, Default)]
pub struct ShortcodeCall {
    /// Attributes parsed from the tag.
    pub attrs: Map<String, Value>,
    /// Inner content between opening and closing tags, if any.
    pub content: Option<String>,
    /// Rendering context supplied by the content pipeline.
    pub context: Value,
}

/// The behavior a plugin contributes to the build.
///
/// `name` and `version` must agree with the plugin's manifest; the kernel
/// validates this at load time. All maps may be empty: a plugin can be
/// purely declarative.
#[derive(Clone, Default)]
pub struct PluginModule {
    /// Plugin machine name (must match the manifest).
    pub name: String,
    /// Semantic version (must parse as strict semver).
    pub version: String,
    /// Hook handlers keyed by hook name.
    pub hooks: HashMap<String, HookFn>,
    /// Shortcode renderers keyed by tag name.
    pub shortcodes: HashMap<String, ShortcodeFn>,
    /// Component renderers keyed by tag name.
    pub components: HashMap<String, ShortcodeFn>,
    /// Directory of static assets the asset pipeline should copy.
    pub assets: Option<PathBuf>,
    /// Default configuration, merged under user configuration at load time.
    pub config: Map<String, Value>,
    /// Invoked when the plugin is removed from the enabled set.
    pub cleanup: Option<CleanupFn>,
}

impl PluginModule {
    /// Create a module with the given name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Attach a hook handler.
    pub fn with_hook(mut self, hook: impl Into<String>, handler: HookFn) -> Self {
        self.hooks.insert(hook.into(), handler);
        self
    }

    /// Attach a shortcode renderer.
    pub fn with_shortcode(mut self, tag: impl Into<String>, handler: ShortcodeFn) -> Self {
        self.shortcodes.insert(tag.into(), handler);
        self
    }

    /// Attach a component renderer.
    pub fn with_component(mut self, tag: impl Into<String>, handler: ShortcodeFn) -> Self {
        self.components.insert(tag.into(), handler);
        self
    }

    /// Set a default configuration key.
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Set the static assets directory.
    pub fn with_assets(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets = Some(dir.into());
        self
    }

    /// Set the cleanup callback.
    pub fn with_cleanup(mut self, cleanup: CleanupFn) -> Self {
        self.cleanup = Some(cleanup);
        self
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .field("shortcodes", &self.shortcodes.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("assets", &self.assets)
            .field("config", &self.config)
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}

/// Wrap an async closure as a [`HookFn`].
pub fn hook_fn<F, Fut>(f: F) -> HookFn
where
    F: Fn(Value, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
{
    Arc::new(move |value, args| Box::pin(f(value, args)))
}

/// Wrap a synchronous closure as a [`HookFn`].
pub fn sync_hook_fn<F>(f: F) -> HookFn
where
    F: Fn(Value, Vec<Value>) -> Result<Option<Value>> + Send + Sync + 'static,
{
    Arc::new(move |value, args| {
        let out = f(value, args);
        Box::pin(std::future::ready(out))
    })
}

/// Wrap an async closure as a [`ShortcodeFn`].
pub fn shortcode_fn<F, Fut>(f: F) -> ShortcodeFn
where
    F: Fn(ShortcodeCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    Arc::new(move |call| Box::pin(f(call)))
}

/// Wrap a synchronous closure as a [`ShortcodeFn`].
pub fn sync_shortcode_fn<F>(f: F) -> ShortcodeFn
where
    F: Fn(ShortcodeCall) -> Result<String> + Send + Sync + 'static,
{
    Arc::new(move |call| {
        let out = f(call);
        Box::pin(std::future::ready(out))
    })
}

/// Wrap an async closure as a [`CleanupFn`].
pub fn cleanup_fn<F, Fut>(f: F) -> CleanupFn
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |context| Box::pin(f(context)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_handlers() {
        let module = PluginModule::new("badges", "1.0.0")
            .with_hook(
                crate::hooks::PAGE_AFTER_RENDER,
                sync_hook_fn(|value, _args| Ok(Some(value))),
            )
            .with_shortcode("badge", sync_shortcode_fn(|_call| Ok(String::new())))
            .with_config("style", json!("flat"));

        assert_eq!(module.name, "badges");
        assert_eq!(module.version, "1.0.0");
        assert_eq!(module.hooks.len(), 1);
        assert!(module.shortcodes.contains_key("badge"));
        assert_eq!(module.config.get("style"), Some(&json!("flat")));
        assert!(module.cleanup.is_none());
    }

    #[tokio::test]
    async fn sync_hook_wrapper_threads_value() {
        let hook = sync_hook_fn(|value, _args| {
            let text = value.as_str().unwrap_or_default();
            Ok(Some(json!(format!("{text}!"))))
        });

        let out = hook(json!("hello"), Vec::new()).await.unwrap();
        assert_eq!(out, Some(json!("hello!")));
    }

    #[tokio::test]
    async fn async_hook_wrapper_passes_args() {
        let hook = hook_fn(|_value, args| async move { Ok(Some(json!(args.len()))) });

        let out = hook(json!(null), vec![json!(1), json!(2)]).await.unwrap();
        assert_eq!(out, Some(json!(2)));
    }

    #[tokio::test]
    async fn shortcode_wrapper_renders() {
        let shortcode = sync_shortcode_fn(|call| {
            let kind = call
                .attrs
                .get("kind")
                .and_then(|v| v.as_str())
                .unwrap_or("note");
            Ok(format!("<div class=\"{kind}\"></div>"))
        });

        let mut attrs = Map::new();
        attrs.insert("kind".to_string(), json!("warning"));
        let call = ShortcodeCall {
            attrs,
            content: None,
            context: Value::Null,
        };

        let html = shortcode(call).await.unwrap();
        assert_eq!(html, "<div class=\"warning\"></div>");
    }

    #[test]
    fn debug_omits_function_pointers() {
        let module = PluginModule::new("debugged", "0.1.0")
            .with_hook("build_start", sync_hook_fn(|v, _| Ok(Some(v))));
        let rendered = format!("{module:?}");
        assert!(rendered.contains("debugged"));
        assert!(rendered.contains("build_start"));
    }
}
