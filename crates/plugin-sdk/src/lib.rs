//! Stampa Plugin SDK
//!
//! Types and helpers for Stampa build plugins. Plugins depend on this crate
//! to describe their behavior as a [`types::PluginModule`] value: lifecycle
//! hook handlers, shortcode and component renderers, default configuration,
//! and an optional cleanup callback. The kernel registers these modules and
//! orchestrates them across the build.

pub mod hooks;
pub mod types;

pub mod prelude {
    pub use crate::hooks;
    pub use crate::types::*;
}
