use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use git2::{BlameOptions, DiffFindOptions, DiffOptions, Repository as Git2Repository};

use crate::commit::{Commit, CommitId, Signature};
use crate::config::Config;
use crate::error::DepsError;

/// A region of change in one file between two trees.
///
/// `old_lines == 0` marks a pure insertion: there is no parent-side range to
/// blame, so the engine skips it (`spec.md` §3, §4.3.3 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

/// Thin wrapper over `git2::Repository` exposing exactly the operations the
/// inference engine needs, each returning an owned, borrow-free value.
pub struct Repo {
    inner: Git2Repository,
}

impl Repo {
    pub fn open(path: &Path) -> Result<Repo, DepsError> {
        match Git2Repository::discover(path) {
            Ok(inner) => Ok(Repo { inner }),
            Err(_) => Err(DepsError::RepositoryNotFound(path.display().to_string())),
        }
    }

    /// Resolves an arbitrary revision expression to a commit, failing with
    /// `InvalidCommitish` if it doesn't resolve or names a non-commit.
    pub fn resolve(&self, rev_expr: &str) -> Result<Commit, DepsError> {
        let object = self
            .inner
            .revparse_single(rev_expr)
            .map_err(|_| DepsError::InvalidCommitish(rev_expr.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| DepsError::InvalidCommitish(rev_expr.to_string()))?;
        Ok(to_owned_commit(&commit))
    }

    pub fn commit(&self, id: &CommitId) -> Result<Commit, DepsError> {
        let oid = parse_oid(id)?;
        let commit = self
            .inner
            .find_commit(oid)
            .map_err(|_| DepsError::InvalidCommitish(id.to_string()))?;
        Ok(to_owned_commit(&commit))
    }

    /// Per-file hunks of the diff from `old` to `new`, using the
    /// repository's standard rename/copy heuristics. The returned path is
    /// the old-side path, the one that must be passed to `blame`.
    pub fn diff(
        &self,
        old: &CommitId,
        new: &CommitId,
        context_lines: u32,
    ) -> Result<Vec<(String, Vec<Hunk>)>, DepsError> {
        let old_commit = self.inner.find_commit(parse_oid(old)?)?;
        let new_commit = self.inner.find_commit(parse_oid(new)?)?;
        let old_tree = old_commit.tree()?;
        let new_tree = new_commit.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(context_lines);

        let mut diff =
            self.inner
                .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true).copies(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut result = Vec::new();
        for delta_idx in 0..diff.deltas().len() {
            let patch = git2::Patch::from_diff(&diff, delta_idx)
                .map_err(|e| DepsError::DiffFailed(e.to_string()))?;
            let Some(patch) = patch else {
                continue;
            };
            let delta = patch.delta();
            let Some(path) = delta.old_file().path().and_then(|p| p.to_str()) else {
                continue;
            };

            let mut hunks = Vec::with_capacity(patch.num_hunks());
            for hunk_idx in 0..patch.num_hunks() {
                let (hunk, _line_count) = patch
                    .hunk(hunk_idx)
                    .map_err(|e| DepsError::DiffFailed(e.to_string()))?;
                hunks.push(Hunk {
                    old_start: hunk.old_start(),
                    old_lines: hunk.old_lines(),
                    new_start: hunk.new_start(),
                    new_lines: hunk.new_lines(),
                });
            }
            result.push((path.to_string(), hunks));
        }

        Ok(result)
    }

    /// True iff `path` exists (as any tree entry) in `commit`'s snapshot.
    pub fn tree_lookup(&self, commit: &CommitId, path: &str) -> Result<bool, DepsError> {
        let commit = self.inner.find_commit(parse_oid(commit)?)?;
        let tree = commit.tree()?;
        match tree.get_path(Path::new(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(DepsError::GitError(e)),
        }
    }

    /// Line attribution over `[start_line, start_line + line_count)` at
    /// `commit` on `path`. Keys are post-range line numbers in `commit`'s
    /// snapshot of `path`.
    pub fn blame(
        &self,
        commit: &CommitId,
        path: &str,
        start_line: u32,
        line_count: u32,
    ) -> Result<BTreeMap<u32, CommitId>, DepsError> {
        if line_count == 0 {
            return Ok(BTreeMap::new());
        }
        let end_line = start_line + line_count - 1;

        let mut opts = BlameOptions::new();
        opts.newest_commit(parse_oid(commit)?);
        opts.min_line(start_line as usize);
        opts.max_line(end_line as usize);

        let blame = self
            .inner
            .blame_file(Path::new(path), Some(&mut opts))
            .map_err(|e| DepsError::BlameFailed(e.to_string()))?;

        let mut result = BTreeMap::new();
        for i in 0..blame.len() {
            let Some(hunk) = blame.get_index(i) else {
                continue;
            };
            let hunk_start = hunk.final_start_line() as u32;
            let hunk_end = hunk_start + hunk.lines_in_hunk() as u32; // exclusive
            let dependency_id = CommitId::from(hunk.final_commit_id());
            for line in hunk_start.max(start_line)..hunk_end.min(end_line + 1) {
                result.insert(line, dependency_id.clone());
            }
        }
        Ok(result)
    }

    /// Native minimal-unique abbreviation of `id`, via libgit2's own
    /// shortening algorithm (no shell-out).
    pub fn short_name(&self, id: &CommitId) -> Result<String, DepsError> {
        let object = self.inner.find_object(parse_oid(id)?, None)?;
        let buf = object.short_id()?;
        Ok(buf.as_str().unwrap_or(id.as_str()).to_string())
    }

    /// Human-readable `git describe --all --long` equivalent. Absorbs the
    /// "no tags/refs reachable" case into an empty string rather than
    /// surfacing it as an error (`spec.md` §7, `DescribeNoTags`).
    ///
    /// This is the one deliberate shell-out in the adapter: libgit2's
    /// describe API targets the repository's current workdir/HEAD, not an
    /// arbitrary commit, so matching `git describe <commit>` exactly means
    /// invoking the real `git` binary (`spec.md` §9 sanctions this for
    /// operations off the engine's hot path — describe is only ever called
    /// by the JSON listener, never by the engine itself).
    pub fn describe(&self, id: &CommitId) -> Result<String, DepsError> {
        let output = Command::new(Config::get().git_cmd())
            .current_dir(self.workdir_or_path())
            .args(["describe", "--all", "--long", id.as_str()])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No tags can describe") || stderr.contains("No names found") {
                return Ok(String::new());
            }
            return Err(DepsError::GitError(git2::Error::from_str(&stderr)));
        }

        let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(normalize_describe(&raw))
    }

    /// Short names of every ref whose tip resolves to `id`.
    pub fn refs_pointing_at(&self, id: &CommitId) -> Result<Vec<String>, DepsError> {
        let target = parse_oid(id)?;
        let mut matching = Vec::new();
        for reference in self.inner.references()?.flatten() {
            let resolved = reference.resolve().unwrap_or(reference);
            if resolved.target() == Some(target) {
                if let Some(shorthand) = resolved.shorthand() {
                    matching.push(shorthand.to_string());
                }
            }
        }
        Ok(matching)
    }

    /// `Some(commit)` iff `a` and `b` share a merge base, `None` for
    /// disjoint histories (rather than propagating libgit2's "no merge
    /// base" error).
    pub fn merge_base(&self, a: &CommitId, b: &CommitId) -> Result<Option<CommitId>, DepsError> {
        match self.inner.merge_base(parse_oid(a)?, parse_oid(b)?) {
            Ok(oid) => Ok(Some(CommitId::from(oid))),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(DepsError::GitError(e)),
        }
    }

    fn workdir_or_path(&self) -> &Path {
        self.inner.workdir().unwrap_or_else(|| self.inner.path())
    }
}

fn parse_oid(id: &CommitId) -> Result<git2::Oid, DepsError> {
    git2::Oid::from_str(id.as_str()).map_err(|_| DepsError::InvalidCommitish(id.to_string()))
}

fn to_owned_commit(commit: &git2::Commit) -> Commit {
    Commit {
        id: CommitId::from(commit.id()),
        parent_ids: commit.parent_ids().map(CommitId::from).collect(),
        author: to_signature(&commit.author()),
        committer: to_signature(&commit.committer()),
        message: commit.message_raw().unwrap_or("").to_string(),
    }
}

fn to_signature(sig: &git2::Signature) -> Signature {
    Signature {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        time: sig.when().seconds(),
        offset_minutes: sig.when().offset_minutes(),
    }
}

/// `heads/main-0-gabcdef1` -> `main`, matching `stable-deps.py`'s
/// `GitUtils.describe` post-processing.
fn normalize_describe(raw: &str) -> String {
    let without_prefix = raw
        .strip_prefix("heads/")
        .or_else(|| raw.strip_prefix("tags/"))
        .or_else(|| raw.strip_prefix("remotes/"))
        .unwrap_or(raw);

    match without_prefix.rsplit_once("-g") {
        Some((rest, hash)) if hash.len() >= 7 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            rest.to_string()
        }
        _ => without_prefix.to_string(),
    }
}
