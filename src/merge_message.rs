//! Merge-commit-message parser
//!
//! Parses a single commit message against an ordered list of named format
//! rules: user-defined custom formats first (declaration order), then the
//! built-ins in fixed priority. The first format whose pattern matches wins;
//! captures are never merged across formats.

use crate::config::GitVerConfig;
use crate::domain::version::{strip_tag_prefix, SemanticVersion};
use crate::error::{GitVerError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// A named merge-message format rule
struct MergeMessageFormat {
    name: &'static str,
    pattern: Regex,
    /// GitHub pull merges carry the repository owner as the first path
    /// segment of the source branch; it is not part of the branch name.
    strips_source_owner: bool,
}

// Built-in formats in fixed priority order. The BitBucketPull pattern keeps
// the historical double "from ... from" matching for compatibility.
fn builtin_formats() -> &'static Vec<MergeMessageFormat> {
    static FORMATS: OnceLock<Vec<MergeMessageFormat>> = OnceLock::new();
    FORMATS.get_or_init(|| {
        let format = |name, pattern: &str, strips_source_owner| MergeMessageFormat {
            name,
            pattern: Regex::new(pattern).expect("builtin merge format pattern"),
            strips_source_owner,
        };
        vec![
            format(
                "Default",
                r"^Merge (branch|tag) '(?P<SourceBranch>[^']*)'(?: into (?P<TargetBranch>\S+))?",
                false,
            ),
            format(
                "GitHubPull",
                r"^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?P<SourceBranch>\S+)(?: into (?P<TargetBranch>\S+))?(?:\r?\n|$)",
                true,
            ),
            format(
                "BitBucketPull",
                r"^Merge pull request #(?P<PullRequestNumber>\d+) (?:from|in) (?:.*) from (?P<SourceBranch>\S+) to (?P<TargetBranch>\S+)",
                false,
            ),
            format(
                "BitBucketPullv7",
                r"^Pull request #(?P<PullRequestNumber>\d+).*\r?\n\r?\nMerge in (?:.*) from (?P<SourceBranch>\S+) to (?P<TargetBranch>\S+)",
                false,
            ),
            format(
                "BitBucketCloudPull",
                r"^Merged in (?P<SourceBranch>\S+) \(pull request #(?P<PullRequestNumber>\d+)\)",
                false,
            ),
            format(
                "SmartGit",
                r"^Finish (?P<SourceBranch>\S+)(?: into (?P<TargetBranch>\S+))?",
                false,
            ),
            format(
                "RemoteTracking",
                r"^Merge remote-tracking branch '(?P<SourceBranch>[^']*)'(?: into (?P<TargetBranch>\S+))?",
                false,
            ),
        ]
    })
}

/// Parse result of one merge commit message
///
/// All fields are empty when no format matched or the message was blank.
/// `merged_branch` may be an empty string: the format matched but did not
/// name a branch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeMessage {
    pub format_name: Option<String>,
    pub merged_branch: Option<String>,
    pub target_branch: Option<String>,
    pub is_merged_pull_request: bool,
    pub pull_request_number: Option<u32>,
    pub version: Option<SemanticVersion>,
}

impl MergeMessage {
    /// Parse a commit message against the configured format rules
    ///
    /// Custom formats from the configuration are tried first, in
    /// declaration order, then the built-ins. Blank input yields the empty
    /// result; a malformed custom pattern is a configuration error.
    pub fn parse(message: &str, config: &GitVerConfig) -> Result<MergeMessage> {
        if message.trim().is_empty() {
            return Ok(MergeMessage::default());
        }

        for (name, pattern) in &config.merge_message_formats {
            let re = Regex::new(pattern).map_err(|e| {
                GitVerError::config(format!("Invalid merge message format '{}': {}", name, e))
            })?;
            if let Some(captures) = re.captures(message) {
                return Ok(Self::from_captures(name, &captures, false, config));
            }
        }

        for format in builtin_formats() {
            if let Some(captures) = format.pattern.captures(message) {
                return Ok(Self::from_captures(
                    format.name,
                    &captures,
                    format.strips_source_owner,
                    config,
                ));
            }
        }

        Ok(MergeMessage::default())
    }

    fn from_captures(
        format_name: &str,
        captures: &regex::Captures<'_>,
        strips_source_owner: bool,
        config: &GitVerConfig,
    ) -> MergeMessage {
        let source = captures
            .name("SourceBranch")
            .map(|m| m.as_str())
            .unwrap_or("");
        let merged_branch = if strips_source_owner {
            // "owner/feature/one" -> "feature/one"
            source
                .split_once('/')
                .map_or(source, |(_, rest)| rest)
                .to_string()
        } else {
            source.to_string()
        };

        let pull_request_number = captures
            .name("PullRequestNumber")
            .and_then(|m| m.as_str().parse::<u32>().ok());

        let version = embedded_version(&merged_branch, &config.tag_prefix);

        MergeMessage {
            format_name: Some(format_name.to_string()),
            merged_branch: Some(merged_branch),
            target_branch: captures.name("TargetBranch").map(|m| m.as_str().to_string()),
            is_merged_pull_request: pull_request_number.is_some(),
            pull_request_number,
            version,
        }
    }
}

/// Extract a semantic version embedded in a branch name
///
/// Each `/`-separated segment is tried in order: the configured tag prefix
/// is stripped case-insensitively and the remainder parsed; the first
/// segment that parses wins. Failure to parse is not an error.
fn embedded_version(branch: &str, tag_prefix: &str) -> Option<SemanticVersion> {
    for segment in branch.split('/') {
        let stripped = strip_tag_prefix(segment, tag_prefix).ok()?;
        if let Some(version) = SemanticVersion::parse(stripped) {
            return Some(version);
        }
    }
    None
}
