use std::collections::{HashSet, VecDeque};

use crate::commit::{Commit, CommitId};

/// FIFO of commits awaiting inference, with a membership set kept in
/// lockstep so queue/set agreement is structural rather than an invariant
/// callers have to maintain by hand (`spec.md` §3).
#[derive(Default)]
pub struct WorkQueue {
    order: VecDeque<Commit>,
    members: HashSet<CommitId>,
}

impl WorkQueue {
    pub fn new() -> Self {
        WorkQueue::default()
    }

    pub fn push_back(&mut self, commit: Commit) {
        self.members.insert(commit.id.clone());
        self.order.push_back(commit);
    }

    pub fn pop_front(&mut self) -> Option<Commit> {
        let commit = self.order.pop_front()?;
        self.members.remove(&commit.id);
        Some(commit)
    }

    pub fn contains(&self, id: &CommitId) -> bool {
        self.members.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
