use std::cell::RefCell;
use std::collections::HashMap;

use crate::commit::CommitId;
use crate::error::DepsError;
use crate::git::repository::Repo;

/// Answers "is `commit` an ancestor of, or equal to, `branch_tip`?", backed
/// by a merge-base computation and memoized per `(commit_id, branch_tip_id)`
/// (`spec.md` §4.2).
pub struct AncestryOracle<'repo> {
    repo: &'repo Repo,
    cache: RefCell<HashMap<(CommitId, CommitId), bool>>,
}

impl<'repo> AncestryOracle<'repo> {
    pub fn new(repo: &'repo Repo) -> Self {
        AncestryOracle {
            repo,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn contains(&self, branch_tip: &CommitId, commit: &CommitId) -> Result<bool, DepsError> {
        let key = (commit.clone(), branch_tip.clone());
        if let Some(cached) = self.cache.borrow().get(&key) {
            return Ok(*cached);
        }

        let result = self.repo.merge_base(branch_tip, commit)?.as_ref() == Some(commit);
        self.cache.borrow_mut().insert(key, result);
        Ok(result)
    }
}
