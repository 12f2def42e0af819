//! Persisted build state.
//!
//! After a successful initialization the manager records which plugins were
//! loaded; before the next one it reads that record back to detect plugins
//! that were enabled previously but are absent now, so their cleanup can run.
//! The store is injectable so tests can swap the JSON file for memory.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The record persisted between builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
    /// Names of the plugins loaded by the last successful initialization.
    pub loaded_plugins: Vec<String>,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

impl BuildState {
    /// Create a record stamped with the current time.
    pub fn now(loaded_plugins: Vec<String>) -> Self {
        Self {
            loaded_plugins,
            timestamp: Utc::now(),
        }
    }
}

/// Where the previous build's state lives.
pub trait StateStore: Send + Sync {
    /// Read the persisted state, `None` when no usable record exists.
    fn load(&self) -> Result<Option<BuildState>>;

    /// Replace the persisted state.
    fn save(&self, state: &BuildState) -> Result<()>;
}

/// JSON file at the project root. Written by the manager only, never by
/// plugins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<BuildState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read build state: {}", self.path.display()))?;

        // A corrupt record only costs cleanup diffing, not the build.
        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "build state file is corrupt, ignoring"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &BuildState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("failed to serialize build state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write build state: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and embedders without a project directory.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<BuildState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<BuildState>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("build state store poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, state: &BuildState) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow!("build state store poisoned"))?;
        *guard = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn json_file_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join(".stampa-plugins.json"));

        assert!(store.load().unwrap().is_none());

        let state = BuildState::now(vec!["markdown".to_string(), "search".to_string()]);
        store.save(&state).unwrap();

        let read = store.load().unwrap().unwrap();
        assert_eq!(read, state);
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".stampa-plugins.json");
        std::fs::write(&path, "not json {").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_shares_state_across_clones() {
        let store = MemoryStore::new();
        let twin = store.clone();

        let state = BuildState::now(vec!["sitemap".to_string()]);
        store.save(&state).unwrap();

        assert_eq!(twin.load().unwrap(), Some(state));
    }
}
