use std::collections::{HashMap, HashSet};

use crate::commit::CommitId;
use crate::error::DepsError;

/// `dependent_id -> (dependency_id -> (path -> set of line numbers))`
/// (`spec.md` §3). The outer two layers are the dependency graph's edges;
/// the inner two are the evidence for each edge.
#[derive(Default)]
pub struct DependencyMap {
    inner: HashMap<CommitId, HashMap<CommitId, HashMap<String, HashSet<u32>>>>,
}

pub type Evidence = HashMap<CommitId, HashMap<String, HashSet<u32>>>;

impl DependencyMap {
    pub fn new() -> Self {
        DependencyMap::default()
    }

    /// Creates the (empty) entry for `dependent` if it doesn't exist yet.
    /// Returns whether this was the first edge being recorded for it
    /// (i.e. whether `new_dependent` should fire).
    pub fn begin_dependent(&mut self, dependent: &CommitId) -> bool {
        if self.inner.contains_key(dependent) {
            false
        } else {
            self.inner.insert(dependent.clone(), HashMap::new());
            true
        }
    }

    /// Creates the (empty) `{path -> {}}` slot for `dependent -> dependency`
    /// if absent. Returns whether this was a new edge.
    pub fn begin_dependency(&mut self, dependent: &CommitId, dependency: &CommitId) -> bool {
        let deps = self
            .inner
            .entry(dependent.clone())
            .or_insert_with(HashMap::new);
        if deps.contains_key(dependency) {
            false
        } else {
            deps.insert(dependency.clone(), HashMap::new());
            true
        }
    }

    /// Ensures a line set exists for `dependent -> dependency` on `path`.
    /// Returns whether it was newly created (i.e. whether `new_path` should
    /// fire).
    pub fn ensure_path(&mut self, dependent: &CommitId, dependency: &CommitId, path: &str) -> bool {
        let paths = self
            .inner
            .entry(dependent.clone())
            .or_insert_with(HashMap::new)
            .entry(dependency.clone())
            .or_insert_with(HashMap::new);
        if paths.contains_key(path) {
            false
        } else {
            paths.insert(path.to_string(), HashSet::new());
            true
        }
    }

    /// Records a supporting line. A duplicate `(dependent, dependency, path,
    /// line)` is a fatal `InvariantViolation` (`spec.md` §3, §7).
    pub fn insert_line(
        &mut self,
        dependent: &CommitId,
        dependency: &CommitId,
        path: &str,
        line: u32,
    ) -> Result<(), DepsError> {
        let lines = self
            .inner
            .entry(dependent.clone())
            .or_insert_with(HashMap::new)
            .entry(dependency.clone())
            .or_insert_with(HashMap::new)
            .entry(path.to_string())
            .or_insert_with(HashSet::new);

        if !lines.insert(line) {
            return Err(DepsError::InvariantViolation(format!(
                "line {} already found when blaming {}:{}",
                line, dependent, path
            )));
        }
        Ok(())
    }

    /// The evidence map for `dependent`, empty if it introduced only new
    /// files (`spec.md` §4.3.2 step e).
    pub fn dependencies_for(&self, dependent: &CommitId) -> Evidence {
        self.inner.get(dependent).cloned().unwrap_or_default()
    }

    /// Materialized `(dependent, dependency)` edges, in no particular order.
    pub fn edges(&self) -> Vec<(CommitId, CommitId)> {
        let mut result = Vec::new();
        for (dependent, deps) in &self.inner {
            for dependency in deps.keys() {
                result.push((dependent.clone(), dependency.clone()));
            }
        }
        result
    }
}
