//! Commit-message increment directives
//!
//! Commit messages may carry `+semver:` directives that raise (or suppress)
//! the version increment. The patterns are configurable; the defaults
//! recognize `+semver: major|minor|patch|none` and their synonyms.

use crate::config::{CommitMessageIncrementMode, GitVerConfig, IncrementStrategy};
use crate::error::{GitVerError, Result};
use regex::Regex;

/// Extract the increment directive from a commit message
///
/// Patterns are tried highest increment first, so a message carrying
/// several directives yields the highest one. The no-bump pattern maps to
/// [IncrementStrategy::None]; a message without any directive yields
/// `Ok(None)`.
///
/// # Errors
/// A malformed configured pattern is a configuration error.
pub fn increment_from_message(
    message: &str,
    config: &GitVerConfig,
) -> Result<Option<IncrementStrategy>> {
    let patterns = [
        (&config.major_version_bump_message, IncrementStrategy::Major),
        (&config.minor_version_bump_message, IncrementStrategy::Minor),
        (&config.patch_version_bump_message, IncrementStrategy::Patch),
        (&config.no_bump_message, IncrementStrategy::None),
    ];

    for (pattern, strategy) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            GitVerError::config(format!("Invalid bump message pattern '{}': {}", pattern, e))
        })?;
        if re.is_match(message) {
            return Ok(Some(strategy));
        }
    }
    Ok(None)
}

/// Whether message directives apply to this kind of commit at all
pub fn applies_to_commit(mode: CommitMessageIncrementMode, is_merge_commit: bool) -> bool {
    match mode {
        CommitMessageIncrementMode::Enabled => true,
        CommitMessageIncrementMode::Disabled => false,
        CommitMessageIncrementMode::MergeMessageOnly => is_merge_commit,
    }
}
