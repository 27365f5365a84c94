use crate::domain::{Branch, Commit, CommitId, Tag};
use crate::error::{GitVerError, Result};
use chrono::{TimeZone, Utc};
use git2::{Oid, Repository as Git2Repo};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    git_dir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let git_dir = repo.path().to_path_buf();

        Ok(Git2Repository { repo, git_dir })
    }

    fn to_commit(&self, commit: &git2::Commit<'_>) -> Commit {
        let when = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Commit {
            id: CommitId::new(commit.id().to_string()),
            when,
            message: commit.message().unwrap_or("").to_string(),
            parent_ids: commit
                .parent_ids()
                .map(|oid| CommitId::new(oid.to_string()))
                .collect(),
        }
    }

    fn parse_oid(id: &CommitId) -> Result<Oid> {
        Oid::from_str(&id.0)
            .map_err(|e| GitVerError::version(format!("Invalid commit id '{}': {}", id, e)))
    }
}

impl super::Repository for Git2Repository {
    fn head_branch(&self) -> Result<Branch> {
        let head = self.repo.head()?;
        let name = head
            .shorthand()
            .ok_or_else(|| GitVerError::branch("HEAD has no branch name".to_string()))?
            .to_string();
        let tip = head.target().map(|oid| CommitId::new(oid.to_string()));

        Ok(Branch::new(name, tip))
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let mut result = Vec::new();
        for entry in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = entry?;
            let name = match branch.name()? {
                Some(name) => name.to_string(),
                None => continue,
            };
            let tip = branch
                .get()
                .target()
                .map(|oid| CommitId::new(oid.to_string()));
            result.push(Branch::new(name, tip));
        }
        Ok(result)
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let mut result = Vec::new();
        for name in self.repo.tag_names(None)?.iter().flatten() {
            let reference_name = format!("refs/tags/{}", name);
            let reference = match self.repo.find_reference(&reference_name) {
                Ok(reference) => reference,
                Err(e) if e.code() == git2::ErrorCode::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            // Peel annotated tags through to the commit
            let target = reference
                .peel(git2::ObjectType::Commit)
                .map_err(|e| GitVerError::tag(format!("Cannot peel tag '{}': {}", name, e)))?
                .id();
            result.push(Tag::new(name, CommitId::new(target.to_string())));
        }
        Ok(result)
    }

    fn find_commit(&self, id: &CommitId) -> Result<Option<Commit>> {
        let oid = Self::parse_oid(id)?;
        match self.repo.find_commit(oid) {
            Ok(commit) => Ok(Some(self.to_commit(&commit))),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn first_parent_history(&self, tip: &CommitId) -> Result<Vec<Commit>> {
        let oid = Self::parse_oid(tip)?;
        let mut commits = Vec::new();
        let mut current = Some(self.repo.find_commit(oid)?);

        while let Some(commit) = current {
            commits.push(self.to_commit(&commit));
            current = match commit.parent(0) {
                Ok(parent) => Some(parent),
                Err(e) if e.code() == git2::ErrorCode::NotFound => None,
                Err(_) => None,
            };
        }

        Ok(commits)
    }

    fn history(&self, tip: &CommitId) -> Result<Vec<Commit>> {
        let oid = Self::parse_oid(tip)?;
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(oid)?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for entry in revwalk {
            let commit = self.repo.find_commit(entry?)?;
            commits.push(self.to_commit(&commit));
        }

        Ok(commits)
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send.
// The trait only performs read operations, which libgit2 handles
// thread-safely.
unsafe impl Sync for Git2Repository {}
