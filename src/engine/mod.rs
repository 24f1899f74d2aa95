pub mod completed;
pub mod dependency_map;
pub mod options;
pub mod queue;

use std::collections::HashMap;

use crate::commit::{Commit, CommitId};
use crate::error::DepsError;
use crate::events::Listener;
use crate::git::{AncestryOracle, Repo};
use crate::utils::debug_log;

pub use completed::CompletedSet;
pub use dependency_map::DependencyMap;
pub use options::EngineOptions;
pub use queue::WorkQueue;

/// Maintains the work queue, completed set, commit cache, and dependency
/// map, and drives `find_dependencies` (`spec.md` §4.3). All caches and
/// maps live for the lifetime of the engine, so a second seed benefits from
/// the first's cached commits and ancestry checks and never redoes
/// completed work.
pub struct Engine<'repo> {
    options: EngineOptions,
    repo: &'repo Repo,
    ancestry: AncestryOracle<'repo>,
    queue: WorkQueue,
    completed: CompletedSet,
    commit_cache: HashMap<CommitId, Commit>,
    dependencies: DependencyMap,
    excluded_tips: Option<Vec<CommitId>>,
    notified_commits: std::collections::HashSet<CommitId>,
    listeners: Vec<Box<dyn Listener>>,
}

impl<'repo> Engine<'repo> {
    pub fn new(options: EngineOptions, repo: &'repo Repo) -> Self {
        Engine {
            options,
            repo,
            ancestry: AncestryOracle::new(repo),
            queue: WorkQueue::new(),
            completed: CompletedSet::new(),
            commit_cache: HashMap::new(),
            dependencies: DependencyMap::new(),
            excluded_tips: None,
            notified_commits: std::collections::HashSet::new(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Drives the queue to completion for one seed revision, emitting
    /// events along the way. Can be called repeatedly with different seeds;
    /// state (caches, completed set, dependency map) accumulates across
    /// calls.
    pub fn find_dependencies(&mut self, seed_rev: &str) -> Result<(), DepsError> {
        let seed = self.repo.resolve(seed_rev)?;
        self.commit_cache.insert(seed.id.clone(), seed.clone());
        self.enqueue(seed);

        while let Some(dependent) = self.queue.pop_front() {
            debug_log(
                self.options.debug,
                &format!("processing {} from queue", short(&dependent.id)),
            );
            self.notify_new_commit(&dependent);

            for parent_id in dependent.parent_ids.clone() {
                let parent = self.get_commit(&parent_id)?;
                self.infer_from_parent(&dependent, &parent)?;
            }

            self.completed.push(dependent.id.clone());
            debug_log(
                self.options.debug,
                &format!("found all dependencies for {}", short(&dependent.id)),
            );

            let deps = self.dependencies.dependencies_for(&dependent.id);
            self.notify_dependent_done(&dependent, &deps);
        }

        self.notify_all_done();
        Ok(())
    }

    /// Materialized view of the current dependency map.
    pub fn edges(&self) -> Vec<(CommitId, CommitId)> {
        self.dependencies.edges()
    }

    fn infer_from_parent(&mut self, dependent: &Commit, parent: &Commit) -> Result<(), DepsError> {
        debug_log(
            self.options.debug,
            &format!(
                "finding dependencies of {} via parent {}",
                short(&dependent.id),
                short(&parent.id)
            ),
        );

        let diff = self
            .repo
            .diff(&parent.id, &dependent.id, self.options.context_lines)?;

        for (path, hunks) in diff {
            if !self.repo.tree_lookup(&parent.id, &path)? {
                // The path didn't exist in the parent: probably a new
                // directory introduced by `dependent` (spec.md §8 S6).
                continue;
            }

            for hunk in hunks {
                if hunk.old_lines == 0 {
                    continue;
                }
                self.blame_hunk(dependent, parent, &path, hunk.old_start, hunk.old_lines)?;
            }
        }

        Ok(())
    }

    fn blame_hunk(
        &mut self,
        dependent: &Commit,
        parent: &Commit,
        path: &str,
        old_start: u32,
        old_lines: u32,
    ) -> Result<(), DepsError> {
        let blamed = self.repo.blame(&parent.id, path, old_start, old_lines)?;

        // BTreeMap iteration is ascending by key, giving the ascending
        // line-number ordering `spec.md` §4.3.3 requires.
        for (line_number, dependency_id) in blamed {
            let dependency = self.get_commit(&dependency_id)?;

            if self.dependencies.begin_dependent(&dependent.id) {
                self.notify_new_dependent(dependent);
            }

            if self.is_excluded(&dependency.id)? {
                continue;
            }

            let is_new_dependency = self
                .dependencies
                .begin_dependency(&dependent.id, &dependency.id);

            if is_new_dependency {
                self.notify_new_commit(&dependency);
                self.notify_new_dependency(dependent, &dependency, path, line_number);

                if self.options.recurse
                    && !self.queue.contains(&dependency.id)
                    && !self.completed.contains(&dependency.id)
                {
                    self.queue.push_back(dependency.clone());
                }
            }

            if self
                .dependencies
                .ensure_path(&dependent.id, &dependency.id, path)
            {
                self.notify_new_path(dependent, &dependency, path, line_number);
            }

            self.dependencies
                .insert_line(&dependent.id, &dependency.id, path, line_number)?;
            self.notify_new_line(dependent, &dependency, path, line_number);
        }

        Ok(())
    }

    fn is_excluded(&mut self, id: &CommitId) -> Result<bool, DepsError> {
        if self.options.exclude_commits.is_empty() {
            return Ok(false);
        }
        let tips = self.resolve_excluded_tips()?;
        for tip in &tips {
            if self.ancestry.contains(tip, id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_excluded_tips(&mut self) -> Result<Vec<CommitId>, DepsError> {
        if let Some(tips) = &self.excluded_tips {
            return Ok(tips.clone());
        }
        let mut tips = Vec::with_capacity(self.options.exclude_commits.len());
        for rev in self.options.exclude_commits.clone() {
            tips.push(self.repo.resolve(&rev)?.id);
        }
        self.excluded_tips = Some(tips.clone());
        Ok(tips)
    }

    fn get_commit(&mut self, id: &CommitId) -> Result<Commit, DepsError> {
        if let Some(commit) = self.commit_cache.get(id) {
            return Ok(commit.clone());
        }
        let commit = self.repo.commit(id)?;
        self.commit_cache.insert(id.clone(), commit.clone());
        Ok(commit)
    }

    /// Enqueues `commit` unless it is already queued or already completed
    /// (`spec.md` §3: enqueued at most once per driver lifetime).
    fn enqueue(&mut self, commit: Commit) {
        if self.queue.contains(&commit.id) || self.completed.contains(&commit.id) {
            return;
        }
        self.queue.push_back(commit);
    }

    fn notify_new_commit(&mut self, commit: &Commit) {
        if !self.notified_commits.insert(commit.id.clone()) {
            return;
        }
        for listener in &mut self.listeners {
            listener.new_commit(commit);
        }
    }

    fn notify_new_dependent(&mut self, dependent: &Commit) {
        for listener in &mut self.listeners {
            listener.new_dependent(dependent);
        }
    }

    fn notify_new_dependency(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        for listener in &mut self.listeners {
            listener.new_dependency(dependent, dependency, path, line);
        }
    }

    fn notify_new_path(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        for listener in &mut self.listeners {
            listener.new_path(dependent, dependency, path, line);
        }
    }

    fn notify_new_line(&mut self, dependent: &Commit, dependency: &Commit, path: &str, line: u32) {
        for listener in &mut self.listeners {
            listener.new_line(dependent, dependency, path, line);
        }
    }

    fn notify_dependent_done(
        &mut self,
        dependent: &Commit,
        deps: &HashMap<CommitId, HashMap<String, std::collections::HashSet<u32>>>,
    ) {
        for listener in &mut self.listeners {
            listener.dependent_done(dependent, deps);
        }
    }

    fn notify_all_done(&mut self) {
        for listener in &mut self.listeners {
            listener.all_done();
        }
    }
}

fn short(id: &CommitId) -> &str {
    &id.as_str()[..id.as_str().len().min(8)]
}
