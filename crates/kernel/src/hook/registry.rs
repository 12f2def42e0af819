//! Hook and shortcode registries.
//!
//! The hook registry maps hook names to an ordered list of handlers; order is
//! the resolved plugin load order, so dependencies run before dependents.
//! Shortcodes and components are single-owner: the last registration wins and
//! the collision is logged, never an error.

use std::collections::HashMap;

use tracing::{debug, warn};

use stampa_sdk::hooks;
use stampa_sdk::types::{HookFn, ShortcodeFn};

/// A registered hook handler with its owning plugin.
#[derive(Clone)]
pub struct HookRegistration {
    /// Plugin that registered this handler.
    pub owner: String,
    /// The handler itself.
    pub handler: HookFn,
}

/// Registry mapping hook names to ordered handler lists.
///
/// Mutated only during registration; read-only while hooks execute.
#[derive(Clone, Default)]
pub struct HookRegistry {
    handlers: HashMap<String, Vec<HookRegistration>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for a hook. Unknown hook names are accepted for
    /// forward compatibility, with a warning.
    pub fn register(&mut self, hook: &str, owner: &str, handler: HookFn) {
        if !hooks::is_known(hook) {
            warn!(hook = %hook, plugin = %owner, "registering handler for unknown hook name");
        }

        debug!(hook = %hook, plugin = %owner, "registered hook handler");
        self.handlers
            .entry(hook.to_string())
            .or_default()
            .push(HookRegistration {
                owner: owner.to_string(),
                handler,
            });
    }

    /// Handlers for a hook, in registration order. Empty when none.
    pub fn handlers(&self, hook: &str) -> &[HookRegistration] {
        self.handlers.get(hook).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_hook(&self, hook: &str) -> bool {
        self.handlers.get(hook).is_some_and(|h| !h.is_empty())
    }

    pub fn handler_count(&self, hook: &str) -> usize {
        self.handlers.get(hook).map(Vec::len).unwrap_or(0)
    }

    /// All hook names with at least one handler.
    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn hook_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut owners: Vec<(&str, Vec<&str>)> = self
            .handlers
            .iter()
            .map(|(hook, regs)| {
                (
                    hook.as_str(),
                    regs.iter().map(|r| r.owner.as_str()).collect(),
                )
            })
            .collect();
        owners.sort_by_key(|(hook, _)| *hook);
        f.debug_struct("HookRegistry").field("hooks", &owners).finish()
    }
}

/// A registered shortcode or component renderer with its owning plugin.
#[derive(Clone)]
pub struct ShortcodeRegistration {
    pub owner: String,
    pub handler: ShortcodeFn,
}

/// Single-owner registry for shortcodes or components.
#[derive(Clone)]
pub struct ShortcodeRegistry {
    kind: &'static str,
    handlers: HashMap<String, ShortcodeRegistration>,
}

impl ShortcodeRegistry {
    /// `kind` labels log lines: "shortcode" or "component".
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handlers: HashMap::new(),
        }
    }

    /// Register a renderer. A name collision replaces the previous owner and
    /// logs a warning.
    pub fn register(&mut self, name: &str, owner: &str, handler: ShortcodeFn) {
        let previous = self.handlers.insert(
            name.to_string(),
            ShortcodeRegistration {
                owner: owner.to_string(),
                handler,
            },
        );

        if let Some(previous) = previous {
            warn!(
                kind = %self.kind,
                name = %name,
                previous_owner = %previous.owner,
                new_owner = %owner,
                "registration replaced, last registration wins"
            );
        } else {
            debug!(kind = %self.kind, name = %name, plugin = %owner, "registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<&ShortcodeRegistration> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for ShortcodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcodeRegistry")
            .field("kind", &self.kind)
            .field("names", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use stampa_sdk::types::{sync_hook_fn, sync_shortcode_fn};

    #[test]
    fn handlers_keep_registration_order() {
        let mut registry = HookRegistry::new();
        registry.register(
            hooks::BUILD_START,
            "first",
            sync_hook_fn(|v, _| Ok(Some(v))),
        );
        registry.register(
            hooks::BUILD_START,
            "second",
            sync_hook_fn(|v, _| Ok(Some(v))),
        );

        let owners: Vec<_> = registry
            .handlers(hooks::BUILD_START)
            .iter()
            .map(|r| r.owner.as_str())
            .collect();
        assert_eq!(owners, vec!["first", "second"]);
        assert_eq!(registry.handler_count(hooks::BUILD_START), 2);
        assert!(registry.has_hook(hooks::BUILD_START));
    }

    #[test]
    fn unregistered_hook_has_no_handlers() {
        let registry = HookRegistry::new();
        assert!(registry.handlers("anything").is_empty());
        assert!(!registry.has_hook("anything"));
        assert_eq!(registry.handler_count("anything"), 0);
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = HookRegistry::new();
        registry.register(hooks::BUILD_END, "p", sync_hook_fn(|v, _| Ok(Some(v))));
        registry.clear();
        assert_eq!(registry.hook_count(), 0);
    }

    #[test]
    fn shortcode_last_registration_wins() {
        let mut registry = ShortcodeRegistry::new("shortcode");
        registry.register("alert", "first", sync_shortcode_fn(|_| Ok("a".into())));
        registry.register("alert", "second", sync_shortcode_fn(|_| Ok("b".into())));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("alert").unwrap().owner, "second");
    }

    #[test]
    fn shortcode_lookup_misses_return_none() {
        let registry = ShortcodeRegistry::new("component");
        assert!(registry.get("missing").is_none());
        assert!(!registry.contains("missing"));
    }
}
