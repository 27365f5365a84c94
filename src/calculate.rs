//! Calculation orchestrator
//!
//! Ties the pieces together for one invocation: take the repository lock,
//! consult the cache, compute on a miss, write the result back. The lock is
//! held for the whole sequence and released by drop on every exit path; a
//! fatal calculation error writes no cache entry.

use crate::cache::{RepositoryLock, VersionCache};
use crate::config::GitVerConfig;
use crate::domain::Branch;
use crate::error::{GitVerError, Result};
use crate::git::Repository;
use crate::mainline::MainlineVersionCalculator;
use crate::variables::VersionVariables;
use tracing::{debug, warn};

/// One version calculation over a repository
pub struct CalculateTool<'a, R: Repository> {
    repo: &'a R,
    config: &'a GitVerConfig,
    no_cache: bool,
}

impl<'a, R: Repository> CalculateTool<'a, R> {
    pub fn new(repo: &'a R, config: &'a GitVerConfig, no_cache: bool) -> Self {
        CalculateTool {
            repo,
            config,
            no_cache,
        }
    }

    /// Compute (or load) the version variables for a branch
    ///
    /// # Arguments
    /// * `branch_name` - Branch to calculate for; `None` uses HEAD
    pub fn calculate_version_variables(
        &self,
        branch_name: Option<&str>,
    ) -> Result<VersionVariables> {
        let branch = self.resolve_branch(branch_name)?;
        let tip = branch.tip.clone().ok_or_else(|| {
            GitVerError::branch(format!("Branch '{}' has no commits", branch.name))
        })?;
        let head = self
            .repo
            .find_commit(&tip)?
            .ok_or_else(|| GitVerError::branch(format!("Cannot resolve commit {}", tip)))?;

        let _lock = RepositoryLock::acquire_blocking(self.repo.git_dir())?;

        let cache = VersionCache::new(
            self.repo.git_dir(),
            &head.id,
            branch.friendly_name(),
            self.config,
        )?;

        if !self.no_cache {
            if let Some(variables) = cache.load() {
                debug!(branch = branch.friendly_name(), "serving cached version");
                return Ok(variables);
            }
        }

        let calculated = MainlineVersionCalculator::new(self.repo, self.config).find_version(&branch)?;
        let variables = VersionVariables::from_parts(
            &calculated.version,
            branch.friendly_name(),
            &head,
            calculated.base_version_source.as_ref(),
            calculated.commits_since_version_source,
        );

        if !self.no_cache {
            if let Err(e) = cache.store(&variables) {
                warn!(error = %e, "failed to write version cache");
            }
        }

        Ok(variables)
    }

    fn resolve_branch(&self, branch_name: Option<&str>) -> Result<Branch> {
        match branch_name {
            None => self.repo.head_branch(),
            Some(name) => self
                .repo
                .branches()?
                .into_iter()
                .find(|b| b.friendly_name() == name || b.name == name)
                .ok_or_else(|| GitVerError::branch(format!("Branch '{}' not found", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use chrono::{TimeZone, Utc};
    use serial_test::serial;

    fn repo_with_tag() -> (MockRepository, tempfile::TempDir) {
        let git_dir = tempfile::tempdir().unwrap();
        let mut repo = MockRepository::new();
        let at = |m| Utc.with_ymd_and_hms(2024, 1, 1, 10, m, 0).unwrap();
        repo.add_commit("a", at(0), "initial", &[]);
        repo.add_commit("b", at(1), "work", &["a"]);
        repo.set_branch("main", "b");
        repo.set_head("main");
        repo.add_tag("v1.0.0", "a");
        repo.set_git_dir(git_dir.path());
        (repo, git_dir)
    }

    #[test]
    #[serial]
    fn test_calculates_head_branch() {
        let (repo, _git_dir) = repo_with_tag();
        let config = GitVerConfig::default();
        let tool = CalculateTool::new(&repo, &config, true);

        let vars = tool.calculate_version_variables(None).unwrap();
        assert_eq!(vars.full_sem_ver, "1.0.1");
        assert_eq!(vars.branch_name, "main");
        assert_eq!(vars.sha, "b");
        assert_eq!(vars.version_source_sha.as_deref(), Some("a"));
        assert_eq!(vars.commits_since_version_source, 1);
    }

    #[test]
    #[serial]
    fn test_explicit_branch_selection() {
        let (repo, _git_dir) = repo_with_tag();
        let config = GitVerConfig::default();
        let tool = CalculateTool::new(&repo, &config, true);

        let vars = tool.calculate_version_variables(Some("main")).unwrap();
        assert_eq!(vars.branch_name, "main");

        let err = tool.calculate_version_variables(Some("missing"));
        assert!(err.is_err());
    }

    #[test]
    #[serial]
    fn test_cache_round_trip() {
        let (repo, _git_dir) = repo_with_tag();
        let config = GitVerConfig::default();

        let tool = CalculateTool::new(&repo, &config, false);
        let first = tool.calculate_version_variables(None).unwrap();
        let second = tool.calculate_version_variables(None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    #[serial]
    fn test_no_commits_is_an_error() {
        let git_dir = tempfile::tempdir().unwrap();
        let mut repo = MockRepository::new();
        repo.set_head("main");
        repo.set_git_dir(git_dir.path());
        let config = GitVerConfig::default();

        let tool = CalculateTool::new(&repo, &config, true);
        assert!(tool.calculate_version_variables(None).is_err());
    }

    #[test]
    #[serial]
    fn test_tip_must_resolve() {
        let git_dir = tempfile::tempdir().unwrap();
        let mut repo = MockRepository::new();
        repo.set_branch("main", "missing");
        repo.set_head("main");
        repo.set_git_dir(git_dir.path());
        let config = GitVerConfig::default();

        let tool = CalculateTool::new(&repo, &config, true);
        let err = tool.calculate_version_variables(None).unwrap_err();
        assert!(matches!(err, GitVerError::Branch(_)));
    }
}
