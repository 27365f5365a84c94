use crate::domain::{Branch, Commit, CommitId, Tag};
use crate::error::{GitVerError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Mock repository for testing without actual git operations
///
/// Holds an in-memory commit graph; history walks are derived from the
/// parent links the test sets up.
pub struct MockRepository {
    commits: HashMap<CommitId, Commit>,
    branches: IndexMap<String, CommitId>,
    tags: Vec<Tag>,
    head: Option<String>,
    git_dir: PathBuf,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            branches: IndexMap::new(),
            tags: Vec::new(),
            head: None,
            git_dir: PathBuf::from(".git"),
        }
    }

    /// Add a commit to the graph
    pub fn add_commit(
        &mut self,
        id: &str,
        when: DateTime<Utc>,
        message: &str,
        parents: &[&str],
    ) -> CommitId {
        let id = CommitId::new(id);
        let commit = Commit {
            id: id.clone(),
            when,
            message: message.to_string(),
            parent_ids: parents.iter().map(|p| CommitId::new(*p)).collect(),
        };
        self.commits.insert(id.clone(), commit);
        id
    }

    /// Set a branch tip
    pub fn set_branch(&mut self, name: impl Into<String>, tip: &str) {
        self.branches.insert(name.into(), CommitId::new(tip));
    }

    /// Set the checked-out branch
    pub fn set_head(&mut self, name: impl Into<String>) {
        self.head = Some(name.into());
    }

    /// Add a tag pointing at a commit
    pub fn add_tag(&mut self, name: impl Into<String>, target: &str) {
        self.tags.push(Tag::new(name, CommitId::new(target)));
    }

    /// Override the metadata directory used for cache/lock paths
    pub fn set_git_dir(&mut self, path: impl Into<PathBuf>) {
        self.git_dir = path.into();
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Repository for MockRepository {
    fn head_branch(&self) -> Result<Branch> {
        let name = self
            .head
            .as_ref()
            .ok_or_else(|| GitVerError::branch("No HEAD set".to_string()))?;
        let tip = self.branches.get(name).cloned();
        Ok(Branch::new(name.clone(), tip))
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self
            .branches
            .iter()
            .map(|(name, tip)| Branch::new(name.clone(), Some(tip.clone())))
            .collect())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn find_commit(&self, id: &CommitId) -> Result<Option<Commit>> {
        Ok(self.commits.get(id).cloned())
    }

    fn first_parent_history(&self, tip: &CommitId) -> Result<Vec<Commit>> {
        let mut commits = Vec::new();
        let mut current = self.commits.get(tip);
        while let Some(commit) = current {
            commits.push(commit.clone());
            current = commit
                .parent_ids
                .first()
                .and_then(|id| self.commits.get(id));
        }
        Ok(commits)
    }

    fn history(&self, tip: &CommitId) -> Result<Vec<Commit>> {
        let mut seen = HashSet::new();
        let mut stack = vec![tip.clone()];
        let mut commits = Vec::new();

        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                commits.push(commit.clone());
                stack.extend(commit.parent_ids.iter().cloned());
            }
        }

        // Newest first, id as deterministic tiebreak
        commits.sort_by(|a, b| b.when.cmp(&a.when).then_with(|| b.id.cmp(&a.id)));
        Ok(commits)
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}
