use std::collections::HashSet;

use crate::commit::CommitId;

/// Identifiers whose dependencies have been fully inferred, as a membership
/// set for O(1) lookups (`spec.md` §3).
#[derive(Default)]
pub struct CompletedSet {
    members: HashSet<CommitId>,
}

impl CompletedSet {
    pub fn new() -> Self {
        CompletedSet::default()
    }

    pub fn push(&mut self, id: CommitId) {
        self.members.insert(id);
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.members.contains(id)
    }
}
