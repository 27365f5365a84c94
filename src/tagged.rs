//! Tagged-semantic-version repository
//!
//! Locates and ranks prior version tags across branch lineages. Each source
//! flag produces an independent candidate sequence; the merge step
//! concatenates, deduplicates by (commit, version), and sorts by commit
//! timestamp descending, so "most recent tag wins" resolution downstream
//! does not depend on per-source evaluation order.

use crate::config::{EffectiveConfig, GitVerConfig};
use crate::domain::{Branch, Commit, CommitId, SemanticVersion, SemanticVersionWithTag};
use crate::error::Result;
use crate::git::Repository;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::ops::BitOr;
use tracing::debug;

/// Bitset selecting which tag sources to search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedVersionSources(u8);

impl TaggedVersionSources {
    /// Tags reachable from the branch's own history
    pub const OF_BRANCH: TaggedVersionSources = TaggedVersionSources(1);
    /// Tags on branches that were merged into the branch
    pub const OF_MERGE_TARGETS: TaggedVersionSources = TaggedVersionSources(2);
    /// Tags on the configured main branches (excluding the branch itself)
    pub const OF_MAIN_BRANCHES: TaggedVersionSources = TaggedVersionSources(4);
    /// Tags on the configured release branches (excluding the branch itself)
    pub const OF_RELEASE_BRANCHES: TaggedVersionSources = TaggedVersionSources(8);
    /// All sources combined
    pub const ALL: TaggedVersionSources = TaggedVersionSources(15);

    pub fn contains(&self, other: TaggedVersionSources) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TaggedVersionSources {
    type Output = TaggedVersionSources;

    fn bitor(self, rhs: TaggedVersionSources) -> TaggedVersionSources {
        TaggedVersionSources(self.0 | rhs.0)
    }
}

type Candidate = (Commit, SemanticVersionWithTag);

/// Finds and classifies version tags reachable from branch lineages
pub struct TaggedVersionRepository<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> TaggedVersionRepository<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TaggedVersionRepository { repo }
    }

    /// Collect tagged semantic versions from the selected sources
    ///
    /// The result is grouped by commit, ordered by commit timestamp
    /// descending, with no duplicate (commit, version) pairs; within a
    /// group, versions keep their candidate order.
    ///
    /// # Arguments
    /// * `branch` - The branch the lookup is relative to
    /// * `label` - Branch-specific label filter; entries whose pre-release
    ///   label does not correspond are dropped
    /// * `not_older_than` - Upper bound on commit timestamps, when given
    /// * `sources` - Which tag sources to search
    pub fn get_tagged_semantic_versions(
        &self,
        branch: &Branch,
        config: &GitVerConfig,
        label: Option<&str>,
        not_older_than: Option<DateTime<Utc>>,
        sources: TaggedVersionSources,
    ) -> Result<Vec<(Commit, Vec<SemanticVersionWithTag>)>> {
        let mut candidates: Vec<Candidate> = Vec::new();

        if sources.contains(TaggedVersionSources::OF_BRANCH) {
            candidates.extend(self.of_branch(branch, config)?);
        }
        if sources.contains(TaggedVersionSources::OF_MERGE_TARGETS) {
            candidates.extend(self.of_merge_targets(branch, config)?);
        }
        if sources.contains(TaggedVersionSources::OF_MAIN_BRANCHES) {
            candidates.extend(self.of_configured_branches(branch, config, |c| c.is_main_branch)?);
        }
        if sources.contains(TaggedVersionSources::OF_RELEASE_BRANCHES) {
            candidates
                .extend(self.of_configured_branches(branch, config, |c| c.is_release_branch)?);
        }

        // Filter, dedup, sort, group - deterministic regardless of the
        // order the sources produced their candidates in.
        candidates.retain(|(commit, entry)| {
            let recent_enough = not_older_than.map_or(true, |limit| commit.when <= limit);
            recent_enough && entry.is_match_for_branch_specific_label(label)
        });

        let mut seen: HashSet<(CommitId, SemanticVersion)> = HashSet::new();
        candidates.retain(|(commit, entry)| {
            seen.insert((commit.id.clone(), entry.version.clone()))
        });

        candidates.sort_by(|(a, va), (b, vb)| {
            b.when
                .cmp(&a.when)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| vb.version.cmp(&va.version))
        });

        let mut grouped: Vec<(Commit, Vec<SemanticVersionWithTag>)> = Vec::new();
        for (commit, entry) in candidates {
            match grouped.last_mut() {
                Some((last, entries)) if last.id == commit.id => entries.push(entry),
                _ => grouped.push((commit, vec![entry])),
            }
        }

        Ok(grouped)
    }

    /// Parse all repository tags under the configured prefix
    ///
    /// A tag that does not parse as a semantic version is skipped.
    fn parsed_tags(&self, config: &GitVerConfig) -> Result<Vec<SemanticVersionWithTag>> {
        let mut parsed = Vec::new();
        for tag in self.repo.tags()? {
            match SemanticVersion::parse_tag(&tag.name, &config.tag_prefix) {
                Ok(version) => parsed.push(SemanticVersionWithTag::new(version, tag)),
                Err(_) => {
                    debug!(tag = %tag.name, "tag is not a semantic version, skipping");
                }
            }
        }
        Ok(parsed)
    }

    fn of_branch(&self, branch: &Branch, config: &GitVerConfig) -> Result<Vec<Candidate>> {
        let Some(tip) = &branch.tip else {
            return Ok(Vec::new());
        };

        let history = self.repo.history(tip)?;
        let reachable: HashSet<&CommitId> = history.iter().map(|c| &c.id).collect();

        let mut candidates = Vec::new();
        for entry in self.parsed_tags(config)? {
            if !reachable.contains(&entry.tag.target) {
                continue;
            }
            if let Some(commit) = self.repo.find_commit(&entry.tag.target)? {
                candidates.push((commit, entry));
            }
        }
        Ok(candidates)
    }

    /// Tags on commits that were merged into the branch
    fn of_merge_targets(&self, branch: &Branch, config: &GitVerConfig) -> Result<Vec<Candidate>> {
        let Some(tip) = &branch.tip else {
            return Ok(Vec::new());
        };

        let merged_parents: HashSet<CommitId> = self
            .repo
            .history(tip)?
            .iter()
            .filter(|c| c.is_merge_commit())
            .flat_map(|c| c.parent_ids.iter().cloned())
            .collect();

        let mut candidates = Vec::new();
        for entry in self.parsed_tags(config)? {
            if !merged_parents.contains(&entry.tag.target) {
                continue;
            }
            if let Some(commit) = self.repo.find_commit(&entry.tag.target)? {
                candidates.push((commit, entry));
            }
        }
        Ok(candidates)
    }

    /// OF_BRANCH applied to every other branch selected by `predicate`,
    /// excluding `branch` itself to prevent self-inclusion loops
    fn of_configured_branches(
        &self,
        branch: &Branch,
        config: &GitVerConfig,
        predicate: impl Fn(&EffectiveConfig) -> bool,
    ) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for other in self.repo.branches()? {
            if other.name == branch.name {
                continue;
            }
            let branch_config = config.branch_configuration(other.friendly_name())?;
            let effective = EffectiveConfig::new(config, &branch_config);
            if predicate(&effective) {
                candidates.extend(self.of_branch(&other, config)?);
            }
        }
        Ok(candidates)
    }
}
