use std::collections::{HashMap, HashSet};

use crate::commit::{Commit, CommitId};

/// Capability contract the engine calls during inference (`spec.md` §4.4).
/// Every method is optional; implementors override only the events they
/// care about. The engine calls these synchronously, in traversal order;
/// listeners must not mutate the engine.
pub trait Listener {
    /// First time the engine encounters `c` (dequeued seed, or a freshly
    /// discovered dependency).
    fn new_commit(&mut self, _commit: &Commit) {}

    /// First edge being recorded for `dependent`.
    fn new_dependent(&mut self, _dependent: &Commit) {}

    /// First edge from `dependent` to `dependency`.
    fn new_dependency(
        &mut self,
        _dependent: &Commit,
        _dependency: &Commit,
        _path: &str,
        _line: u32,
    ) {
    }

    /// First evidence of `dependent -> dependency` on `path`.
    fn new_path(&mut self, _dependent: &Commit, _dependency: &Commit, _path: &str, _line: u32) {}

    /// Each supporting line.
    fn new_line(&mut self, _dependent: &Commit, _dependency: &Commit, _path: &str, _line: u32) {}

    /// `dependent`'s dependencies have been fully inferred.
    fn dependent_done(
        &mut self,
        _dependent: &Commit,
        _dependencies: &HashMap<CommitId, HashMap<String, HashSet<u32>>>,
    ) {
    }

    /// The driver queue has drained.
    fn all_done(&mut self) {}
}
