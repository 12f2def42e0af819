//! Hook system for plugin extension points.
//!
//! Hooks are named extension points fired at fixed moments of the build.
//! When a hook executes, every registered handler runs in resolved load
//! order, each one fully awaited before the next.

mod registry;

pub use registry::{HookRegistration, HookRegistry, ShortcodeRegistration, ShortcodeRegistry};
