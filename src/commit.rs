use std::fmt;

use serde::Serialize;

/// A commit identifier: the full 40-character hex object id.
///
/// Wrapped rather than used as a raw `git2::Oid` so that caches, the work
/// queue, and the dependency map can outlive any single borrow of the
/// underlying `git2::Repository`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommitId(String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid.to_string())
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        CommitId(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        CommitId(s.to_string())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author or committer metadata, as found on a commit object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since epoch.
    pub time: i64,
    /// Minutes east of UTC.
    pub offset_minutes: i32,
}

/// An immutable commit snapshot, detached from any `git2` borrow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commit {
    pub id: CommitId,
    pub parent_ids: Vec<CommitId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    /// The first line of the message, up to (not including) the first newline.
    pub fn title(&self) -> &str {
        match self.message.split_once('\n') {
            Some((title, _)) => title,
            None => &self.message,
        }
    }

    /// "\n" if the message has a body, "" if it is a single line.
    pub fn separator(&self) -> &'static str {
        if self.message.contains('\n') {
            "\n"
        } else {
            ""
        }
    }

    /// Everything after the title's newline, with leading newlines stripped.
    pub fn body(&self) -> &str {
        match self.message.split_once('\n') {
            Some((_, rest)) => rest.trim_start_matches('\n'),
            None => "",
        }
    }

}
