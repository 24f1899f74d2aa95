use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::Serialize;

use crate::commit::{Commit, CommitId};
use crate::error::DepsError;
use crate::events::Listener;
use crate::git::Repo;

#[derive(Debug, Clone, Serialize)]
struct JsonCommit {
    explored: bool,
    sha1: String,
    name: String,
    describe: String,
    refs: Vec<String>,
    author_name: String,
    author_mail: String,
    author_time: i64,
    author_offset: i32,
    committer_name: String,
    committer_mail: String,
    committer_time: i64,
    committer_offset: i32,
    title: String,
    separator: String,
    body: String,
}

#[derive(Debug, Clone, Serialize)]
struct JsonDependency {
    parent: String,
    child: String,
}

#[derive(Debug, Clone, Serialize)]
struct JsonGraph {
    commits: Vec<JsonCommit>,
    dependencies: Vec<JsonDependency>,
}

/// Builds the WebCola/d3-consumable dependency graph described in
/// `spec.md` §6.2, grounded in `JSONDependencyListener` from
/// `stable-deps.py`. Dependency direction in the output follows the
/// Python original: `parent` is the dependent commit (the one whose diff
/// produced the hunk), `child` is the dependency it blames back to.
pub struct JsonGraphListener<'repo> {
    repo: &'repo Repo,
    indices: HashMap<CommitId, usize>,
    graph: JsonGraph,
}

impl<'repo> JsonGraphListener<'repo> {
    pub fn new(repo: &'repo Repo) -> Self {
        JsonGraphListener {
            repo,
            indices: HashMap::new(),
            graph: JsonGraph {
                commits: Vec::new(),
                dependencies: Vec::new(),
            },
        }
    }

    /// The accumulated graph, ready to serialize with `serde_json`.
    pub fn into_graph(self) -> Result<serde_json::Value, DepsError> {
        Ok(serde_json::to_value(&self.graph)?)
    }

    fn graph_snapshot(&self) -> Result<serde_json::Value, DepsError> {
        Ok(serde_json::to_value(&self.graph)?)
    }

    fn add_commit(&mut self, commit: &Commit) -> Result<usize, DepsError> {
        if let Some(&index) = self.indices.get(&commit.id) {
            return Ok(index);
        }

        let describe = self.repo.describe(&commit.id)?;
        let refs = self.repo.refs_pointing_at(&commit.id)?;
        let name = self.repo.short_name(&commit.id)?;

        let json_commit = JsonCommit {
            explored: false,
            sha1: commit.id.to_string(),
            name,
            describe,
            refs,
            author_name: commit.author.name.clone(),
            author_mail: commit.author.email.clone(),
            author_time: commit.author.time,
            author_offset: commit.author.offset_minutes,
            committer_name: commit.committer.name.clone(),
            committer_mail: commit.committer.email.clone(),
            committer_time: commit.committer.time,
            committer_offset: commit.committer.offset_minutes,
            title: commit.title().to_string(),
            separator: commit.separator().to_string(),
            body: commit.body().to_string(),
        };

        let index = self.graph.commits.len();
        self.graph.commits.push(json_commit);
        self.indices.insert(commit.id.clone(), index);
        Ok(index)
    }
}

impl<'repo> Listener for JsonGraphListener<'repo> {
    fn new_commit(&mut self, commit: &Commit) {
        if let Err(e) = self.add_commit(commit) {
            eprintln!("git-deps: couldn't describe commit {}: {}", commit.id, e);
        }
    }

    fn new_dependency(&mut self, dependent: &Commit, dependency: &Commit, _path: &str, _line: u32) {
        self.graph.dependencies.push(JsonDependency {
            parent: dependent.id.to_string(),
            child: dependency.id.to_string(),
        });
    }

    fn dependent_done(
        &mut self,
        dependent: &Commit,
        _dependencies: &HashMap<CommitId, HashMap<String, HashSet<u32>>>,
    ) {
        if let Some(&index) = self.indices.get(&dependent.id) {
            self.graph.commits[index].explored = true;
        }
    }
}

/// `Rc<RefCell<_>>` handle to a [`JsonGraphListener`], so a caller can keep
/// a reference to read `into_graph()` after handing the engine a listener
/// it otherwise takes ownership of.
#[derive(Clone)]
pub struct SharedJsonGraphListener<'repo>(Rc<RefCell<JsonGraphListener<'repo>>>);

impl<'repo> SharedJsonGraphListener<'repo> {
    pub fn new(repo: &'repo Repo) -> Self {
        SharedJsonGraphListener(Rc::new(RefCell::new(JsonGraphListener::new(repo))))
    }

    pub fn into_graph(self) -> Result<serde_json::Value, DepsError> {
        match Rc::try_unwrap(self.0) {
            Ok(cell) => cell.into_inner().into_graph(),
            Err(rc) => rc.borrow().graph_snapshot(),
        }
    }
}

impl<'repo> Listener for SharedJsonGraphListener<'repo> {
    fn new_commit(&mut self, commit: &Commit) {
        self.0.borrow_mut().new_commit(commit);
    }

    fn new_dependency(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.0.borrow_mut().new_dependency(dependent, dependency, path, line);
    }

    fn dependent_done(
        &mut self,
        dependent: &Commit,
        dependencies: &HashMap<CommitId, HashMap<String, HashSet<u32>>>,
    ) {
        self.0.borrow_mut().dependent_done(dependent, dependencies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Signature;

    fn commit(id: &str, message: &str) -> Commit {
        Commit {
            id: CommitId::from(id.to_string() + &"0".repeat(40 - id.len())),
            parent_ids: vec![],
            author: Signature {
                name: "a".into(),
                email: "a@example.com".into(),
                time: 0,
                offset_minutes: 0,
            },
            committer: Signature {
                name: "a".into(),
                email: "a@example.com".into(),
                time: 0,
                offset_minutes: 0,
            },
            message: message.into(),
        }
    }

    #[test]
    fn title_separator_body_split_matches_python_partition_semantics() {
        let c = commit("abc", "Title\n\nBody line");
        assert_eq!(c.title(), "Title");
        assert_eq!(c.separator(), "\n");
        assert_eq!(c.body(), "Body line");
    }
}
