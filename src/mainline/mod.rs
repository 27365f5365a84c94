//! Mainline version calculation
//!
//! Walks the first-parent history of the target branch once, oldest commit
//! first, handing each commit to the first matching rule in the chain. The
//! rules accumulate state in a [MainlineContext] and emit candidate base
//! versions; after the walk the candidate resolving to the highest version
//! wins and the branch label is applied on top.

pub mod context;
pub mod increment;
pub mod iteration;
pub mod rules;

pub use context::{BaseVersionIncrement, MainlineContext};
pub use iteration::{MainlineCommit, MainlineIteration};

use crate::config::{EffectiveConfig, GitVerConfig};
use crate::domain::{Branch, CommitId, PreRelease, SemanticVersion, SemanticVersionWithTag};
use crate::error::{GitVerError, Result};
use crate::git::Repository;
use crate::tagged::{TaggedVersionRepository, TaggedVersionSources};
use rules::{rule_chain, RuleEnv};
use std::collections::HashMap;
use tracing::debug;

/// Outcome of one calculation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatedVersion {
    pub version: SemanticVersion,
    /// Commit the base version was taken from, when one was established
    pub base_version_source: Option<CommitId>,
    /// Trunk commits between the base version source and the head
    pub commits_since_version_source: u32,
}

/// Calculates the next semantic version for a branch
pub struct MainlineVersionCalculator<'a, R: Repository> {
    repo: &'a R,
    config: &'a GitVerConfig,
}

impl<'a, R: Repository> MainlineVersionCalculator<'a, R> {
    pub fn new(repo: &'a R, config: &'a GitVerConfig) -> Self {
        MainlineVersionCalculator { repo, config }
    }

    /// Compute the next version for `branch`
    ///
    /// # Errors
    /// A branch without commits, or a walk that produces no candidate base
    /// version, is a fatal calculation error.
    pub fn find_version(&self, branch: &Branch) -> Result<CalculatedVersion> {
        let tip = branch.tip.as_ref().ok_or_else(|| {
            GitVerError::branch(format!("Branch '{}' has no commits", branch.name))
        })?;

        let branch_name = branch.friendly_name();
        let branch_config = self.config.branch_configuration(branch_name)?;
        let effective = EffectiveConfig::new(self.config, &branch_config);
        let label = effective.branch_specific_label(branch_name);

        let history = self.repo.first_parent_history(tip)?;
        let iteration = MainlineIteration::from_history(&history);
        let head = iteration.head().ok_or_else(|| {
            GitVerError::calculation(format!("Branch '{}' has an empty history", branch.name))
        })?;

        let tagged = self.tagged_versions_by_commit(branch, &effective, label.as_deref(), head)?;

        let env = RuleEnv {
            config: self.config,
            effective: &effective,
            branch_label: label.as_deref(),
        };

        let mut ctx = MainlineContext::new();
        let mut candidates: Vec<BaseVersionIncrement> = Vec::new();
        let empty: Vec<SemanticVersionWithTag> = Vec::new();

        for commit in iteration.commits() {
            let versions = tagged.get(&commit.commit.id).unwrap_or(&empty);
            for rule in rule_chain() {
                if rule.match_precondition(commit, versions) {
                    debug!(
                        commit = %commit.commit.id.short(),
                        rule = rule.name(),
                        "trunk commit handled"
                    );
                    candidates.extend(rule.get_increments(commit, versions, &mut ctx, &env)?);
                    break;
                }
            }
        }

        let best = candidates
            .iter()
            .max_by(|a, b| {
                a.resulting_version()
                    .cmp(&b.resulting_version())
                    .then_with(|| {
                        a.alternative_semantic_version
                            .cmp(&b.alternative_semantic_version)
                    })
            })
            .ok_or_else(|| {
                GitVerError::calculation(format!(
                    "Could not establish a base version for branch '{}'",
                    branch.name
                ))
            })?;

        let version = apply_label(best.resulting_version(), best.label.as_deref());

        let head_index = iteration.commits().len() - 1;
        let commits_since = match &best.base_version_source {
            Some(source) => match iteration.index_of(source) {
                Some(index) => (head_index - index) as u32,
                None => head_index as u32 + 1,
            },
            None => head_index as u32 + 1,
        };

        Ok(CalculatedVersion {
            version,
            base_version_source: best.base_version_source.clone(),
            commits_since_version_source: commits_since,
        })
    }

    /// One tagged-version lookup per calculation, grouped by commit id
    fn tagged_versions_by_commit(
        &self,
        branch: &Branch,
        effective: &EffectiveConfig,
        label: Option<&str>,
        head: &MainlineCommit,
    ) -> Result<HashMap<CommitId, Vec<SemanticVersionWithTag>>> {
        let mut sources = TaggedVersionSources::OF_BRANCH;
        if effective.track_merge_target {
            sources = sources | TaggedVersionSources::OF_MERGE_TARGETS;
        }
        if effective.tracks_release_branches {
            sources = sources | TaggedVersionSources::OF_RELEASE_BRANCHES;
        }
        if !effective.is_main_branch {
            sources = sources | TaggedVersionSources::OF_MAIN_BRANCHES;
        }

        let grouped = TaggedVersionRepository::new(self.repo).get_tagged_semantic_versions(
            branch,
            self.config,
            label,
            Some(head.commit.when),
            sources,
        )?;

        Ok(grouped
            .into_iter()
            .map(|(commit, versions)| (commit.id, versions))
            .collect())
    }
}

/// Apply the branch label to a resolved version
///
/// No label leaves the version untouched. With a label, a matching
/// pre-release continues its numbering; anything else starts the label at 1.
fn apply_label(version: SemanticVersion, label: Option<&str>) -> SemanticVersion {
    let Some(label) = label else {
        return version;
    };
    match &version.pre_release {
        Some(pre) if pre.matches_label(Some(label)) => {
            let next = pre.increment_number();
            SemanticVersion {
                pre_release: Some(next),
                ..version
            }
        }
        _ => SemanticVersion {
            pre_release: Some(PreRelease::new(label, Some(1))),
            build_metadata: None,
            ..version
        },
    }
}
