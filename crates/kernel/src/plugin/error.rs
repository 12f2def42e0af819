//! Plugin system error types with clear, actionable messages.
//!
//! All errors include the plugin name and relevant context to help
//! site authors quickly identify and fix issues.

use thiserror::Error;

/// Errors that can occur during plugin resolution and loading.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Plugin directory is missing the .info.toml manifest file.
    #[error("plugin '{plugin}': no .info.toml manifest found in {path}")]
    MissingManifest { plugin: String, path: String },

    /// Multiple .info.toml files found in a plugin directory.
    #[error("plugin directory '{path}': multiple .info.toml files found, expected exactly one")]
    MultipleManifests { path: String },

    /// The .info.toml file could not be parsed or failed validation.
    #[error("plugin '{plugin}': failed to parse manifest: {details}")]
    InvalidManifest { plugin: String, details: String },

    /// The loaded plugin has an invalid shape (bad version, name mismatch).
    #[error("plugin '{plugin}': invalid plugin: {details}")]
    InvalidPlugin { plugin: String, details: String },

    /// A builtin plugin name resolved outside the builtin plugins directory.
    #[error("plugin '{plugin}': resolved path {path} escapes the builtin plugins directory")]
    UnsafePath { plugin: String, path: String },

    /// No loading strategy produced the plugin.
    #[error("plugin '{plugin}': not found (sources tried: {tried})")]
    NotFound { plugin: String, tried: String },

    /// A required dependency names a plugin that is not installed.
    #[error("'{dependency}' (required by {requester}) does not match any installed plugin")]
    MissingDependency {
        requester: String,
        dependency: String,
    },

    /// A required capability has no provider among installed plugins.
    #[error("no installed plugin provides capability '{capability}' (required by {requester})")]
    NoProvider {
        requester: String,
        capability: String,
    },

    /// Circular dependency detected.
    #[error("circular dependency detected: {chain}")]
    CircularDependency { chain: String },

    /// A hook handler returned an error during execution.
    #[error("plugin '{plugin}': hook '{hook}' failed: {details}")]
    HookFailed {
        plugin: String,
        hook: String,
        details: String,
    },

    /// A cleanup callback failed while a removed plugin was being retired.
    #[error("plugin '{plugin}': cleanup failed: {details}")]
    CleanupFailed { plugin: String, details: String },

    /// Filesystem failure while locating or reading a plugin.
    #[error("plugin '{plugin}': {source}")]
    Io {
        plugin: String,
        #[source]
        source: std::io::Error,
    },
}

impl PluginError {
    /// Create an invalid-plugin error.
    pub fn invalid_plugin(plugin: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidPlugin {
            plugin: plugin.into(),
            details: details.into(),
        }
    }

    /// Create a not-found error listing every source tried.
    pub fn not_found(plugin: impl Into<String>, tried: &[String]) -> Self {
        Self::NotFound {
            plugin: plugin.into(),
            tried: tried.join(", "),
        }
    }

    /// Create a circular-dependency error from the full visiting chain.
    pub fn circular(chain: &[String]) -> Self {
        Self::CircularDependency {
            chain: chain.join(" -> "),
        }
    }

    /// Create a hook-failure error with owner attribution.
    pub fn hook_failed(
        plugin: impl Into<String>,
        hook: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::HookFailed {
            plugin: plugin.into(),
            hook: hook.into(),
            details: details.into(),
        }
    }

    /// Create an io error attributed to a plugin.
    pub fn io(plugin: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            plugin: plugin.into(),
            source,
        }
    }
}
