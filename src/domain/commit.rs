use chrono::{DateTime, Utc};
use std::fmt;

/// Git object id newtype (hex string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(pub String);

impl CommitId {
    /// Create a commit id from a hex string
    pub fn new(hex: impl Into<String>) -> Self {
        CommitId(hex.into())
    }

    /// Shortened (7 character) form of the id
    pub fn short(&self) -> &str {
        if self.0.len() > 7 {
            &self.0[..7]
        } else {
            &self.0
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commit information consumed by the calculation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit id
    pub id: CommitId,
    /// Commit timestamp
    pub when: DateTime<Utc>,
    /// The full commit message
    pub message: String,
    /// Parent commit ids, first parent first
    pub parent_ids: Vec<CommitId>,
}

impl Commit {
    /// A commit with more than one parent is a merge commit
    pub fn is_merge_commit(&self) -> bool {
        self.parent_ids.len() > 1
    }
}
