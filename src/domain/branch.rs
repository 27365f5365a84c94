use crate::domain::commit::CommitId;

/// Represents a git branch reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Full or short reference name (e.g., "refs/heads/main", "main")
    pub name: String,
    /// The branch tip, when resolved
    pub tip: Option<CommitId>,
}

impl Branch {
    /// Create a new branch reference
    pub fn new(name: impl Into<String>, tip: Option<CommitId>) -> Self {
        Branch {
            name: name.into(),
            tip,
        }
    }

    /// Friendly branch name with the refs prefix stripped
    ///
    /// "refs/heads/feature/one" and "refs/remotes/origin/feature/one" both
    /// yield "feature/one"; a plain name passes through unchanged.
    pub fn friendly_name(&self) -> &str {
        friendly_branch_name(&self.name)
    }
}

/// Strip refs prefixes (and the remote segment) from a reference name
pub fn friendly_branch_name(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix("refs/heads/") {
        return rest;
    }
    if let Some(rest) = name.strip_prefix("refs/remotes/") {
        // Drop the remote name segment
        return rest.split_once('/').map_or(rest, |(_, branch)| branch);
    }
    if let Some(rest) = name.strip_prefix("refs/tags/") {
        return rest;
    }
    name
}
