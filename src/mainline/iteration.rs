//! First-parent trunk iteration
//!
//! The calculation walks the trunk once, oldest commit first. Commits live
//! in an arena vector and are linked by indices, so the walk can look at a
//! commit's neighbours without any reference cycles.

use crate::domain::Commit;

/// One commit on the trunk, with its neighbours as arena indices
#[derive(Debug, Clone)]
pub struct MainlineCommit {
    pub commit: Commit,
    pub index: usize,
    /// The older neighbour; `None` for the first commit
    pub predecessor: Option<usize>,
    /// The newer neighbour; `None` identifies the head
    pub successor: Option<usize>,
}

impl MainlineCommit {
    /// Whether this commit is the branch head
    pub fn is_head(&self) -> bool {
        self.successor.is_none()
    }
}

/// Arena of trunk commits ordered oldest to newest
#[derive(Debug)]
pub struct MainlineIteration {
    commits: Vec<MainlineCommit>,
}

impl MainlineIteration {
    /// Build the iteration from a first-parent history (newest first)
    pub fn from_history(history: &[Commit]) -> Self {
        let count = history.len();
        let commits = history
            .iter()
            .rev()
            .enumerate()
            .map(|(index, commit)| MainlineCommit {
                commit: commit.clone(),
                index,
                predecessor: index.checked_sub(1),
                successor: if index + 1 < count {
                    Some(index + 1)
                } else {
                    None
                },
            })
            .collect();
        MainlineIteration { commits }
    }

    pub fn commits(&self) -> &[MainlineCommit] {
        &self.commits
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// The branch head, when the iteration is non-empty
    pub fn head(&self) -> Option<&MainlineCommit> {
        self.commits.last()
    }

    /// Arena index of a commit id, when present on the trunk
    pub fn index_of(&self, id: &crate::domain::CommitId) -> Option<usize> {
        self.commits.iter().position(|c| &c.commit.id == id)
    }
}
