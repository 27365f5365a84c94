//! Increment rule chain
//!
//! Each trunk commit is handled by exactly one rule: the chain is tried in
//! order, most specific first, and the first rule whose precondition holds
//! wins. Specialized rules call the shared base behavior explicitly and
//! then extend its effect, so composition is visible at the call site
//! instead of hidden behind virtual dispatch.

use crate::config::{EffectiveConfig, GitVerConfig};
use crate::domain::SemanticVersionWithTag;
use crate::error::Result;
use crate::mainline::context::{BaseVersionIncrement, MainlineContext};
use crate::mainline::increment::{applies_to_commit, increment_from_message};
use crate::mainline::iteration::MainlineCommit;
use crate::merge_message::MergeMessage;

/// Read-only inputs shared by all rules during one traversal
pub struct RuleEnv<'a> {
    pub config: &'a GitVerConfig,
    pub effective: &'a EffectiveConfig,
    /// Resolved branch-specific label; `None` means stable
    pub branch_label: Option<&'a str>,
}

/// One rule in the chain
pub trait IncrementRule {
    fn name(&self) -> &'static str;

    /// Whether this rule handles the commit
    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
    ) -> bool;

    /// Apply the rule, mutating the context and emitting zero or more
    /// candidates
    fn get_increments(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>>;
}

/// The chain, most specific first
pub fn rule_chain() -> &'static [&'static dyn IncrementRule] {
    const CHAIN: &[&dyn IncrementRule] = &[
        &LastCommitOnTrunkWithStableTag,
        &CommitOnTrunkWithStableTag,
        &LastCommitOnTrunkWithPreReleaseTag,
        &CommitOnTrunkWithPreReleaseTag,
        &LastMergeCommitOnTrunk,
        &MergeCommitOnTrunk,
        &LastCommitOnTrunk,
        &CommitOnTrunk,
    ];
    CHAIN
}

fn has_stable_tag(tagged: &[SemanticVersionWithTag]) -> bool {
    tagged.iter().any(|t| t.version.is_stable())
}

fn has_pre_release_tag(tagged: &[SemanticVersionWithTag]) -> bool {
    tagged.iter().any(|t| !t.version.is_stable())
}

/// Shared behavior: a stable tag resets the context onto the tag version
fn apply_stable_tag(
    commit: &MainlineCommit,
    tagged: &[SemanticVersionWithTag],
    ctx: &mut MainlineContext,
) {
    let version = tagged
        .iter()
        .filter(|t| t.version.is_stable())
        .map(|t| &t.version)
        .max()
        .cloned();
    if let Some(version) = version {
        ctx.rebase(commit.commit.id.clone(), version.clone());
        ctx.add_alternative(version);
    }
}

/// Shared behavior: a pre-release tag only contributes an alternative
fn apply_pre_release_tag(tagged: &[SemanticVersionWithTag], ctx: &mut MainlineContext) {
    let version = tagged
        .iter()
        .filter(|t| !t.version.is_stable())
        .map(|t| &t.version)
        .max()
        .cloned();
    if let Some(version) = version {
        ctx.add_alternative(version);
    }
}

/// Shared behavior: a merge commit may contribute an embedded version and a
/// message-directive increment
fn apply_merge_commit(
    commit: &MainlineCommit,
    ctx: &mut MainlineContext,
    env: &RuleEnv<'_>,
) -> Result<bool> {
    let mut recorded_alternative = false;

    if env.effective.track_merge_message {
        let parsed = MergeMessage::parse(&commit.commit.message, env.config)?;
        if let Some(version) = parsed.version {
            // The merged branch carries its own version. Prevention takes
            // it as-is; otherwise the branch increment applies on top.
            let alternative = if env.effective.prevent_increment_of_merged_branch {
                version
            } else {
                version.increment(env.effective.increment)
            };
            ctx.add_alternative(alternative);
            recorded_alternative = true;
        }
    }

    apply_message_increment(commit, ctx, env)?;
    Ok(recorded_alternative)
}

/// Shared behavior: accumulate a `+semver:` directive when the mode allows
fn apply_message_increment(
    commit: &MainlineCommit,
    ctx: &mut MainlineContext,
    env: &RuleEnv<'_>,
) -> Result<()> {
    let mode = env.effective.commit_message_incrementing;
    if !applies_to_commit(mode, commit.commit.is_merge_commit()) {
        return Ok(());
    }
    if let Some(increment) = increment_from_message(&commit.commit.message, env.config)? {
        ctx.accumulate_increment(increment);
    }
    Ok(())
}

/// Shared behavior at the branch head: the branch configuration's increment
/// and label take effect
fn finalize_head(ctx: &mut MainlineContext, env: &RuleEnv<'_>) {
    ctx.accumulate_increment(env.effective.increment);
    ctx.label = env.branch_label.map(str::to_string);
}

/// Head commit carrying a stable tag
///
/// When the configuration does not prevent incrementing a tagged commit,
/// the branch increment is forced past the tag; a main branch never
/// re-releases the tagged version itself.
pub struct LastCommitOnTrunkWithStableTag;

impl IncrementRule for LastCommitOnTrunkWithStableTag {
    fn name(&self) -> &'static str {
        "LastCommitOnTrunkWithStableTag"
    }

    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
    ) -> bool {
        commit.is_head() && has_stable_tag(tagged)
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_stable_tag(commit, tagged, ctx);
        if !env.effective.prevent_increment_when_current_commit_tagged {
            finalize_head(ctx, env);
            if env.effective.is_main_branch {
                ctx.force_increment = true;
            }
        }
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// A stable tag in the middle of the trunk resets the base version
pub struct CommitOnTrunkWithStableTag;

impl IncrementRule for CommitOnTrunkWithStableTag {
    fn name(&self) -> &'static str {
        "CommitOnTrunkWithStableTag"
    }

    fn match_precondition(
        &self,
        _commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
    ) -> bool {
        has_stable_tag(tagged)
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        _env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_stable_tag(commit, tagged, ctx);
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// Head commit carrying a pre-release tag
pub struct LastCommitOnTrunkWithPreReleaseTag;

impl IncrementRule for LastCommitOnTrunkWithPreReleaseTag {
    fn name(&self) -> &'static str {
        "LastCommitOnTrunkWithPreReleaseTag"
    }

    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
    ) -> bool {
        commit.is_head() && has_pre_release_tag(tagged)
    }

    fn get_increments(
        &self,
        _commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_pre_release_tag(tagged, ctx);
        if !env.effective.prevent_increment_when_current_commit_tagged {
            // The branch configuration decides increment and label; the tag
            // version stays available as the highest alternative.
            finalize_head(ctx, env);
        }
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// A pre-release tag in the middle of the trunk is an alternative only
pub struct CommitOnTrunkWithPreReleaseTag;

impl IncrementRule for CommitOnTrunkWithPreReleaseTag {
    fn name(&self) -> &'static str {
        "CommitOnTrunkWithPreReleaseTag"
    }

    fn match_precondition(
        &self,
        _commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
    ) -> bool {
        has_pre_release_tag(tagged)
    }

    fn get_increments(
        &self,
        _commit: &MainlineCommit,
        tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        _env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_pre_release_tag(tagged, ctx);
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// Merge commit at the branch head
pub struct LastMergeCommitOnTrunk;

impl IncrementRule for LastMergeCommitOnTrunk {
    fn name(&self) -> &'static str {
        "LastMergeCommitOnTrunk"
    }

    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
    ) -> bool {
        commit.is_head() && commit.commit.is_merge_commit()
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_merge_commit(commit, ctx, env)?;
        finalize_head(ctx, env);
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// Merge commit in the middle of the trunk
pub struct MergeCommitOnTrunk;

impl IncrementRule for MergeCommitOnTrunk {
    fn name(&self) -> &'static str {
        "MergeCommitOnTrunk"
    }

    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
    ) -> bool {
        commit.commit.is_merge_commit()
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        let recorded_alternative = apply_merge_commit(commit, ctx, env)?;
        // Only a merge that brought in a version is worth a candidate of
        // its own; plain merges just accumulate.
        if recorded_alternative {
            Ok(vec![ctx.candidate(self.name())])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Plain commit at the branch head
pub struct LastCommitOnTrunk;

impl IncrementRule for LastCommitOnTrunk {
    fn name(&self) -> &'static str {
        "LastCommitOnTrunk"
    }

    fn match_precondition(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
    ) -> bool {
        commit.is_head()
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_message_increment(commit, ctx, env)?;
        finalize_head(ctx, env);
        Ok(vec![ctx.candidate(self.name())])
    }
}

/// Plain commit in the middle of the trunk; accumulates, emits nothing
pub struct CommitOnTrunk;

impl IncrementRule for CommitOnTrunk {
    fn name(&self) -> &'static str {
        "CommitOnTrunk"
    }

    fn match_precondition(
        &self,
        _commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
    ) -> bool {
        true
    }

    fn get_increments(
        &self,
        commit: &MainlineCommit,
        _tagged: &[SemanticVersionWithTag],
        ctx: &mut MainlineContext,
        env: &RuleEnv<'_>,
    ) -> Result<Vec<BaseVersionIncrement>> {
        apply_message_increment(commit, ctx, env)?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchConfig, CommitMessageIncrementMode, IncrementStrategy};
    use crate::domain::{Commit, CommitId, SemanticVersion, Tag};
    use chrono::{TimeZone, Utc};

    fn commit(id: &str, message: &str, parents: &[&str], head: bool) -> MainlineCommit {
        MainlineCommit {
            commit: Commit {
                id: CommitId::new(id),
                when: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                message: message.to_string(),
                parent_ids: parents.iter().copied().map(CommitId::new).collect(),
            },
            index: 0,
            predecessor: None,
            successor: if head { None } else { Some(1) },
        }
    }

    fn tagged(version: &str) -> SemanticVersionWithTag {
        SemanticVersionWithTag::new(
            SemanticVersion::parse(version).unwrap(),
            Tag::new(format!("v{}", version), CommitId::new("x")),
        )
    }

    fn env_for<'a>(
        config: &'a GitVerConfig,
        effective: &'a EffectiveConfig,
        label: Option<&'a str>,
    ) -> RuleEnv<'a> {
        RuleEnv {
            config,
            effective,
            branch_label: label,
        }
    }

    fn main_effective(config: &GitVerConfig) -> EffectiveConfig {
        let branch = config.branch_configuration("main").unwrap();
        EffectiveConfig::new(config, &branch)
    }

    #[test]
    fn test_chain_order_is_most_specific_first() {
        let chain = rule_chain();
        assert_eq!(chain.first().unwrap().name(), "LastCommitOnTrunkWithStableTag");
        assert_eq!(chain.last().unwrap().name(), "CommitOnTrunk");
    }

    #[test]
    fn test_stable_tag_rule_matches_before_fallback() {
        let c = commit("a", "release", &[], false);
        let tags = vec![tagged("1.0.0")];
        let chain = rule_chain();
        let rule = chain
            .iter()
            .find(|r| r.match_precondition(&c, &tags))
            .unwrap();
        assert_eq!(rule.name(), "CommitOnTrunkWithStableTag");
    }

    #[test]
    fn test_stable_tag_resets_base() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();
        ctx.accumulate_increment(IncrementStrategy::Major);

        let c = commit("a", "release", &[], false);
        let out = CommitOnTrunkWithStableTag
            .get_increments(&c, &[tagged("1.0.0")], &mut ctx, &env)
            .unwrap();

        assert_eq!(ctx.base_version, SemanticVersion::new(1, 0, 0));
        assert_eq!(ctx.increment, IncrementStrategy::None);
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn test_stable_tag_at_head_of_main_forces_increment() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();

        let c = commit("a", "release", &[], true);
        let out = LastCommitOnTrunkWithStableTag
            .get_increments(&c, &[tagged("1.0.0")], &mut ctx, &env)
            .unwrap();

        // main's default increment is Patch and is forced past the tag
        assert!(out[0].force_increment);
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(1, 0, 1));
    }

    #[test]
    fn test_tagged_head_kept_when_prevented() {
        let config = GitVerConfig::default();
        // develop keeps the default prevent-when-tagged = true
        let branch = config.branch_configuration("develop").unwrap();
        let effective = EffectiveConfig::new(&config, &branch);
        let env = env_for(&config, &effective, Some("alpha"));
        let mut ctx = MainlineContext::new();

        let c = commit("a", "release", &[], true);
        let out = LastCommitOnTrunkWithStableTag
            .get_increments(&c, &[tagged("1.0.0")], &mut ctx, &env)
            .unwrap();

        assert!(!out[0].force_increment);
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn test_pre_release_tag_is_alternative_only() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("base"), SemanticVersion::new(1, 0, 0));

        let c = commit("a", "tagged", &[], false);
        CommitOnTrunkWithPreReleaseTag
            .get_increments(&c, &[tagged("1.1.0-beta.1")], &mut ctx, &env)
            .unwrap();

        // Base untouched, alternative recorded
        assert_eq!(ctx.base_version, SemanticVersion::new(1, 0, 0));
        assert_eq!(
            ctx.max_alternative(),
            Some(&SemanticVersion::parse("1.1.0-beta.1").unwrap())
        );
    }

    #[test]
    fn test_merge_commit_records_embedded_version() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();

        let c = commit("m", "Merge branch 'release/2.0.0'", &["a", "b"], false);
        let out = MergeCommitOnTrunk
            .get_increments(&c, &[], &mut ctx, &env)
            .unwrap();

        // main prevents incrementing the merged branch, version taken as-is
        assert_eq!(
            ctx.max_alternative(),
            Some(&SemanticVersion::new(2, 0, 0))
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_plain_merge_emits_no_candidate() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();

        let c = commit("m", "Merge branch 'feature/one'", &["a", "b"], false);
        let out = MergeCommitOnTrunk
            .get_increments(&c, &[], &mut ctx, &env)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_head_commit_takes_branch_increment_and_label() {
        let config = GitVerConfig::default();
        let branch = config.branch_configuration("develop").unwrap();
        let effective = EffectiveConfig::new(&config, &branch);
        let env = env_for(&config, &effective, Some("alpha"));
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("base"), SemanticVersion::new(1, 0, 0));

        let c = commit("a", "work", &[], true);
        let out = LastCommitOnTrunk
            .get_increments(&c, &[], &mut ctx, &env)
            .unwrap();

        // develop's increment is Minor
        assert_eq!(out[0].increment, IncrementStrategy::Minor);
        assert_eq!(out[0].label.as_deref(), Some("alpha"));
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(1, 1, 0));
    }

    #[test]
    fn test_message_directive_outranks_branch_increment() {
        let config = GitVerConfig::default();
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("base"), SemanticVersion::new(1, 0, 0));

        let c = commit("a", "Big rewrite +semver: major", &[], true);
        let out = LastCommitOnTrunk
            .get_increments(&c, &[], &mut ctx, &env)
            .unwrap();
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(2, 0, 0));
    }

    #[test]
    fn test_directive_ignored_when_disabled() {
        let mut config = GitVerConfig::default();
        config.commit_message_incrementing = CommitMessageIncrementMode::Disabled;
        let effective = main_effective(&config);
        let env = env_for(&config, &effective, None);
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("base"), SemanticVersion::new(1, 0, 0));

        let c = commit("a", "Big rewrite +semver: major", &[], true);
        let out = LastCommitOnTrunk
            .get_increments(&c, &[], &mut ctx, &env)
            .unwrap();
        // Falls back to main's Patch increment
        assert_eq!(out[0].resulting_version(), SemanticVersion::new(1, 0, 1));
    }

    #[test]
    fn test_unmatched_branch_uses_defaults() {
        let config = GitVerConfig::default();
        let effective = EffectiveConfig::new(&config, &BranchConfig::default());
        assert_eq!(effective.increment, IncrementStrategy::Patch);
        assert!(!effective.is_main_branch);
    }
}
