//! Plugin dependency resolution.
//!
//! Computes a load order over the transitive closure of the enabled set so
//! that dependencies always precede dependents. Uses depth-first traversal
//! with three node states (unvisited, in progress, done); re-entering an
//! in-progress node is a cycle and the error carries the full visiting chain.
//!
//! A required name absent from the registry is treated as an abstract
//! capability and matched against the `provides` lists of installed plugins.

use std::collections::HashMap;

use tracing::warn;

use super::error::PluginError;
use super::loader::{PACKAGE_PREFIX, is_path_like};
use super::registry::PluginRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Outcome of a side-effect-free [`PluginResolver::validate`] run.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// True when no errors were collected.
    pub valid: bool,
    /// Fatal problems: missing required dependencies, unsatisfied
    /// capabilities, dependency cycles.
    pub errors: Vec<String>,
    /// Non-fatal observations: missing optional dependencies, ambiguous
    /// capability providers.
    pub warnings: Vec<String>,
}

/// Resolves plugin load order against a descriptor registry.
#[derive(Debug)]
pub struct PluginResolver<'a> {
    registry: &'a PluginRegistry,
}

/// A dependency name that is not a registry entry: either a concrete plugin
/// identifier that is simply missing, or an abstract capability.
fn looks_like_plugin_id(name: &str) -> bool {
    name.contains('@') || is_path_like(name) || name.starts_with(PACKAGE_PREFIX)
}

fn describe_requester(requested_by: Option<&str>) -> String {
    match requested_by {
        Some(name) => format!("plugin '{name}'"),
        None => "the site configuration".to_string(),
    }
}

impl<'a> PluginResolver<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Compute the load order for the enabled set and its transitive
    /// dependencies.
    pub fn resolve(&self, enabled: &[String]) -> Result<Vec<String>, PluginError> {
        let mut marks: HashMap<String, Mark> = HashMap::new();
        let mut chain: Vec<String> = Vec::new();
        let mut order: Vec<String> = Vec::new();

        for name in enabled {
            self.visit(name.trim(), None, &mut marks, &mut chain, &mut order)?;
        }

        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        requested_by: Option<&str>,
        marks: &mut HashMap<String, Mark>,
        chain: &mut Vec<String>,
        order: &mut Vec<String>,
    ) -> Result<(), PluginError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(PluginError::circular(&cycle));
            }
            None => {}
        }

        let Some(manifest) = self.registry.get(name) else {
            return self.visit_capability(name, requested_by, marks, chain, order);
        };

        marks.insert(name.to_string(), Mark::InProgress);
        chain.push(name.to_string());

        for dep in &manifest.dependencies.required {
            self.visit(dep, Some(name), marks, chain, order)?;
        }
        for dep in &manifest.dependencies.optional {
            if self.registry.contains(dep) {
                self.visit(dep, Some(name), marks, chain, order)?;
            }
        }

        chain.pop();
        marks.insert(name.to_string(), Mark::Done);
        order.push(name.to_string());
        Ok(())
    }

    fn visit_capability(
        &self,
        capability: &str,
        requested_by: Option<&str>,
        marks: &mut HashMap<String, Mark>,
        chain: &mut Vec<String>,
        order: &mut Vec<String>,
    ) -> Result<(), PluginError> {
        let providers = self.registry.providers_of(capability);
        match providers.as_slice() {
            [] => {
                if looks_like_plugin_id(capability) {
                    Err(PluginError::MissingDependency {
                        requester: describe_requester(requested_by),
                        dependency: capability.to_string(),
                    })
                } else {
                    Err(PluginError::NoProvider {
                        requester: describe_requester(requested_by),
                        capability: capability.to_string(),
                    })
                }
            }
            [only] => {
                let provider = (*only).to_string();
                self.visit(&provider, requested_by, marks, chain, order)
            }
            [first, rest @ ..] => {
                warn!(
                    capability = %capability,
                    chosen = %first,
                    ignored = ?rest,
                    "multiple providers for capability, using the first in registry order"
                );
                let provider = (*first).to_string();
                self.visit(&provider, requested_by, marks, chain, order)
            }
        }
    }

    /// Check the enabled set without building an order.
    ///
    /// Collects every problem instead of stopping at the first, and leaves
    /// the resolver (and registry) untouched. Agrees with [`resolve`] on
    /// success or failure for the same input.
    ///
    /// [`resolve`]: Self::resolve
    pub fn validate(&self, enabled: &[String]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut marks: HashMap<String, Mark> = HashMap::new();
        let mut chain: Vec<String> = Vec::new();

        for name in enabled {
            self.check(name.trim(), None, &mut marks, &mut chain, &mut report);
        }

        report.valid = report.errors.is_empty();
        report
    }

    fn check(
        &self,
        name: &str,
        requested_by: Option<&str>,
        marks: &mut HashMap<String, Mark>,
        chain: &mut Vec<String>,
        report: &mut ValidationReport,
    ) {
        match marks.get(name) {
            Some(Mark::Done) => return,
            Some(Mark::InProgress) => {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                report.errors.push(PluginError::circular(&cycle).to_string());
                return;
            }
            None => {}
        }

        let Some(manifest) = self.registry.get(name) else {
            self.check_capability(name, requested_by, marks, chain, report);
            return;
        };

        marks.insert(name.to_string(), Mark::InProgress);
        chain.push(name.to_string());

        for dep in &manifest.dependencies.required {
            self.check(dep, Some(name), marks, chain, report);
        }
        for dep in &manifest.dependencies.optional {
            if self.registry.contains(dep) {
                self.check(dep, Some(name), marks, chain, report);
            } else {
                report.warnings.push(format!(
                    "optional dependency '{dep}' of plugin '{name}' is not installed"
                ));
            }
        }

        chain.pop();
        marks.insert(name.to_string(), Mark::Done);
    }

    fn check_capability(
        &self,
        capability: &str,
        requested_by: Option<&str>,
        marks: &mut HashMap<String, Mark>,
        chain: &mut Vec<String>,
        report: &mut ValidationReport,
    ) {
        let providers = self.registry.providers_of(capability);
        match providers.as_slice() {
            [] => {
                let err = if looks_like_plugin_id(capability) {
                    PluginError::MissingDependency {
                        requester: describe_requester(requested_by),
                        dependency: capability.to_string(),
                    }
                } else {
                    PluginError::NoProvider {
                        requester: describe_requester(requested_by),
                        capability: capability.to_string(),
                    }
                };
                report.errors.push(err.to_string());
            }
            [only] => {
                let provider = (*only).to_string();
                self.check(&provider, requested_by, marks, chain, report);
            }
            [first, rest @ ..] => {
                report.warnings.push(format!(
                    "capability '{capability}' has multiple providers ({first}, {}), using '{first}'",
                    rest.join(", ")
                ));
                let provider = (*first).to_string();
                self.check(&provider, requested_by, marks, chain, report);
            }
        }
    }
}
