use std::fmt;

#[derive(Debug)]
pub enum DepsError {
    /// A user-supplied revision expression did not resolve to a commit.
    InvalidCommitish(String),
    /// No repository was found at or above the given path.
    RepositoryNotFound(String),
    /// An internal consistency check failed; fatal.
    InvariantViolation(String),
    /// Blame failed for a reason other than a missing path.
    BlameFailed(String),
    /// Diffing two commits failed.
    DiffFailed(String),
    GitError(git2::Error),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for DepsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepsError::InvalidCommitish(rev) => {
                write!(f, "couldn't resolve commitish '{}'", rev)
            }
            DepsError::RepositoryNotFound(path) => {
                write!(f, "no git repository found at or above '{}'", path)
            }
            DepsError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            DepsError::BlameFailed(msg) => write!(f, "blame failed: {}", msg),
            DepsError::DiffFailed(msg) => write!(f, "diff failed: {}", msg),
            DepsError::GitError(e) => write!(f, "git error: {}", e),
            DepsError::IoError(e) => write!(f, "IO error: {}", e),
            DepsError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for DepsError {}

impl From<git2::Error> for DepsError {
    fn from(err: git2::Error) -> Self {
        DepsError::GitError(err)
    }
}

impl From<std::io::Error> for DepsError {
    fn from(err: std::io::Error) -> Self {
        DepsError::IoError(err)
    }
}

impl From<serde_json::Error> for DepsError {
    fn from(err: serde_json::Error) -> Self {
        DepsError::JsonError(err)
    }
}
