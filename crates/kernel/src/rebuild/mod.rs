//! Incremental-rebuild dependency graph.
//!
//! Tracks which build artifacts depend on which (a page on its template, a
//! template on a partial) so the dev loop can compute the cascade of rebuilds
//! after a change. The two adjacency views are kept mutually inverse at all
//! times; graphs may contain cycles (mutually including templates are legal)
//! and traversal must still terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

/// Bidirectional dependency graph over opaque artifact identifiers.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// dependent -> what it depends on
    dependencies: HashMap<String, HashSet<String>>,
    /// dependency -> who depends on it
    dependents: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` depends on `dependency`, in both views.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.dependencies
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string());
        self.dependents
            .entry(dependency.to_string())
            .or_default()
            .insert(dependent.to_string());
    }

    /// Forget everything `dependent` depends on.
    ///
    /// Must be called before re-registering a reprocessed file's
    /// dependencies; stale edges cause missed or spurious cascade rebuilds.
    pub fn clear_node(&mut self, dependent: &str) {
        let Some(old_deps) = self.dependencies.remove(dependent) else {
            return;
        };

        for dependency in &old_deps {
            if let Some(reverse) = self.dependents.get_mut(dependency) {
                reverse.remove(dependent);
                if reverse.is_empty() {
                    self.dependents.remove(dependency);
                }
            }
        }

        debug!(node = %dependent, edges = old_deps.len(), "cleared node dependencies");
    }

    /// Direct dependents of a node, sorted for determinism.
    pub fn dependents_of(&self, node: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .dependents
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Direct dependencies of a node, sorted for determinism.
    pub fn dependencies_of(&self, node: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .dependencies
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Every artifact transitively affected by a change to `node`.
    ///
    /// Breadth-first over the dependents relation with a visited set, so
    /// cycles terminate and each node is returned exactly once. The start
    /// node itself is not included.
    pub fn all_dependents(&self, node: &str) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(node);

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(node);

        let mut affected = Vec::new();
        while let Some(current) = queue.pop_front() {
            if let Some(direct) = self.dependents.get(current) {
                let mut next: Vec<&str> = direct
                    .iter()
                    .map(String::as_str)
                    .filter(|d| !visited.contains(*d))
                    .collect();
                next.sort_unstable();
                for dependent in next {
                    visited.insert(dependent);
                    affected.push(dependent.to_string());
                    queue.push_back(dependent);
                }
            }
        }

        affected
    }

    /// Whether the graph has any edge touching the node.
    pub fn is_tracked(&self, node: &str) -> bool {
        self.dependencies.contains_key(node) || self.dependents.contains_key(node)
    }

    /// Number of distinct nodes appearing in either view.
    pub fn node_count(&self) -> usize {
        let mut nodes: HashSet<&str> = HashSet::new();
        nodes.extend(self.dependencies.keys().map(String::as_str));
        nodes.extend(self.dependents.keys().map(String::as_str));
        nodes.len()
    }

    /// Drop every edge.
    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }
}
