use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use git_deps::commit::{Commit, CommitId};
use git_deps::events::Listener;
use git_deps::git::Repo;

/// Builds throwaway repositories with controlled commit/parent/content
/// shapes, grounded in the teacher's `tests/repos/test_repo.rs` harness but
/// using `git2` directly to assemble trees from blobs rather than shelling
/// to a `git` binary: this crate's adapter never shells out for tree/commit
/// construction, and tests against hand-built commits exercise the same
/// code paths as a checked-out working tree would (`spec.md` §8).
pub struct TestRepo {
    _dir: TempDir,
    repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create tempdir");
        let repo = Repository::init(dir.path()).expect("failed to init repository");
        TestRepo {
            _dir: dir,
            repo,
            clock: Cell::new(1_700_000_000),
        }
    }

    pub fn path(&self) -> &Path {
        self.repo.workdir().expect("bare repo has no workdir")
    }

    /// Opens this repository through the crate's own adapter, the way the
    /// engine would.
    pub fn open(&self) -> Repo {
        Repo::open(self.path()).expect("failed to open repo through adapter")
    }

    /// Creates a commit whose full tree is exactly `files` (path -> content),
    /// parented on `parents`. Each call advances an internal clock so commits
    /// have distinct, increasing author/committer timestamps.
    pub fn commit(&self, message: &str, files: &[(&str, &str)], parents: &[&git2::Commit]) -> CommitId {
        let tree_oid = build_tree(&self.repo, files);
        let tree = self.repo.find_tree(tree_oid).expect("missing tree");

        let time = self.clock.get();
        self.clock.set(time + 60);
        let sig = Signature::new("Test User", "test@example.com", &Time::new(time, 0))
            .expect("failed to build signature");

        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, parents)
            .expect("failed to create commit");
        CommitId::from(oid)
    }

    pub fn find_commit(&self, id: &CommitId) -> git2::Commit {
        self.repo
            .find_commit(Oid::from_str(id.as_str()).unwrap())
            .expect("commit not found")
    }
}

/// Builds the S1 fixture from `spec.md` §8: commit A adds `f.txt` with five
/// lines, B changes line 3, C changes line 3 again. Shared by the linear,
/// exclusion, and context-expansion scenarios, which each drive the same
/// history with different `EngineOptions`.
pub fn build_linear_history(repo: &TestRepo) -> (CommitId, CommitId, CommitId) {
    let lines = ["line1", "line2", "line3", "line4", "line5"];
    let content_a = lines.join("\n") + "\n";
    let a = repo.commit("add f", &[("f.txt", &content_a)], &[]);

    let mut lines_b = lines;
    lines_b[2] = "line3-b";
    let content_b = lines_b.join("\n") + "\n";
    let a_commit = repo.find_commit(&a);
    let b = repo.commit("change line 3 (b)", &[("f.txt", &content_b)], &[&a_commit]);

    let mut lines_c = lines_b;
    lines_c[2] = "line3-c";
    let content_c = lines_c.join("\n") + "\n";
    let b_commit = repo.find_commit(&b);
    let c = repo.commit("change line 3 (c)", &[("f.txt", &content_c)], &[&b_commit]);

    (a, b, c)
}

fn build_tree(repo: &Repository, files: &[(&str, &str)]) -> Oid {
    let mut top_level: Vec<(&str, &str)> = Vec::new();
    let mut subdirs: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();

    for (path, content) in files {
        match path.split_once('/') {
            Some((dir, rest)) => subdirs.entry(dir).or_default().push((rest, content)),
            None => top_level.push((path, content)),
        }
    }

    let mut builder = repo.treebuilder(None).expect("failed to create treebuilder");
    for (path, content) in top_level {
        let blob_oid = repo.blob(content.as_bytes()).expect("failed to write blob");
        builder
            .insert(path, blob_oid, 0o100644)
            .expect("failed to insert blob entry");
    }
    for (dir, entries) in subdirs {
        let subtree_oid = build_tree(repo, &entries);
        builder
            .insert(dir, subtree_oid, 0o040000)
            .expect("failed to insert subtree entry");
    }
    builder.write().expect("failed to write tree")
}

/// A single event as recorded by [`RecordingListener`], in arrival order
/// (`spec.md` §4.4, §8 invariant 8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NewCommit(CommitId),
    NewDependent(CommitId),
    NewDependency(CommitId, CommitId, String, u32),
    NewPath(CommitId, CommitId, String, u32),
    NewLine(CommitId, CommitId, String, u32),
    DependentDone(CommitId),
    AllDone,
}

/// Records every event the engine emits, for post-hoc assertions
/// (`spec.md` §8). Never mutates the engine; purely an observer.
#[derive(Default)]
pub struct RecordingListener {
    pub events: Vec<Event>,
}

impl Listener for RecordingListener {
    fn new_commit(&mut self, commit: &Commit) {
        self.events.push(Event::NewCommit(commit.id.clone()));
    }

    fn new_dependent(&mut self, dependent: &Commit) {
        self.events.push(Event::NewDependent(dependent.id.clone()));
    }

    fn new_dependency(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.events.push(Event::NewDependency(
            dependent.id.clone(),
            dependency.id.clone(),
            path.to_string(),
            line,
        ));
    }

    fn new_path(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.events.push(Event::NewPath(
            dependent.id.clone(),
            dependency.id.clone(),
            path.to_string(),
            line,
        ));
    }

    fn new_line(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.events.push(Event::NewLine(
            dependent.id.clone(),
            dependency.id.clone(),
            path.to_string(),
            line,
        ));
    }

    fn dependent_done(
        &mut self,
        dependent: &Commit,
        _dependencies: &HashMap<CommitId, HashMap<String, HashSet<u32>>>,
    ) {
        self.events.push(Event::DependentDone(dependent.id.clone()));
    }

    fn all_done(&mut self) {
        self.events.push(Event::AllDone);
    }
}

impl RecordingListener {
    /// Index of the first event for which `pred` holds, if any.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

/// `Rc<RefCell<_>>` handle to a [`RecordingListener`] so a test can keep a
/// reference to read back events after handing the engine a listener it
/// otherwise takes ownership of, mirroring `SharedJsonGraphListener`.
#[derive(Clone, Default)]
pub struct SharedRecordingListener(Rc<RefCell<RecordingListener>>);

impl SharedRecordingListener {
    pub fn new() -> Self {
        SharedRecordingListener::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }
}

impl Listener for SharedRecordingListener {
    fn new_commit(&mut self, commit: &Commit) {
        self.0.borrow_mut().new_commit(commit);
    }

    fn new_dependent(&mut self, dependent: &Commit) {
        self.0.borrow_mut().new_dependent(dependent);
    }

    fn new_dependency(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.0.borrow_mut().new_dependency(dependent, dependency, path, line);
    }

    fn new_path(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.0.borrow_mut().new_path(dependent, dependency, path, line);
    }

    fn new_line(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        self.0.borrow_mut().new_line(dependent, dependency, path, line);
    }

    fn dependent_done(
        &mut self,
        dependent: &Commit,
        dependencies: &HashMap<CommitId, HashMap<String, HashSet<u32>>>,
    ) {
        self.0.borrow_mut().dependent_done(dependent, dependencies);
    }

    fn all_done(&mut self) {
        self.0.borrow_mut().all_done();
    }
}
