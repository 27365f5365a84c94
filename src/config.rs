//! Hierarchical configuration model.
//!
//! Global settings plus an ordered list of branch configuration entries.
//! Branch entries keep every field optional; `inherit` fills unset fields
//! from a parent without ever overwriting an explicitly set one. The fully
//! resolved view for a single branch is [EffectiveConfig].

use crate::error::{GitVerError, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the version number is incremented for a branch
///
/// `Inherit` defers to the parent configuration. The derived ordering is
/// used when accumulating increments: Major > Minor > Patch > None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, Default)]
pub enum IncrementStrategy {
    #[default]
    Inherit,
    None,
    Patch,
    Minor,
    Major,
}

/// Deployment mode for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum DeploymentMode {
    #[default]
    ManualDeployment,
    ContinuousDelivery,
    ContinuousDeployment,
}

/// Whether commit messages may drive increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum CommitMessageIncrementMode {
    #[default]
    Enabled,
    Disabled,
    MergeMessageOnly,
}

/// Prevent-increment settings, all optional (unset = inherit)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct PreventIncrementConfig {
    #[serde(default)]
    pub of_merged_branch: Option<bool>,
    #[serde(default)]
    pub when_branch_merged: Option<bool>,
    #[serde(default)]
    pub when_current_commit_tagged: Option<bool>,
}

impl PreventIncrementConfig {
    fn inherit(&self, parent: &PreventIncrementConfig) -> PreventIncrementConfig {
        PreventIncrementConfig {
            of_merged_branch: self.of_merged_branch.or(parent.of_merged_branch),
            when_branch_merged: self.when_branch_merged.or(parent.when_branch_merged),
            when_current_commit_tagged: self
                .when_current_commit_tagged
                .or(parent.when_current_commit_tagged),
        }
    }
}

/// Configuration for one branch entry; every field optional
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct BranchConfig {
    #[serde(default)]
    pub deployment_mode: Option<DeploymentMode>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub increment: IncrementStrategy,

    #[serde(default)]
    pub prevent_increment: PreventIncrementConfig,

    #[serde(default)]
    pub track_merge_target: Option<bool>,

    #[serde(default)]
    pub track_merge_message: Option<bool>,

    #[serde(default)]
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,

    /// Regular expression matching branch names this entry applies to
    #[serde(default)]
    pub regex: Option<String>,

    #[serde(default)]
    pub source_branches: Vec<String>,

    #[serde(default)]
    pub is_source_branch_for: Vec<String>,

    #[serde(default)]
    pub tracks_release_branches: Option<bool>,

    #[serde(default)]
    pub is_release_branch: Option<bool>,

    #[serde(default)]
    pub is_main_branch: Option<bool>,

    #[serde(default)]
    pub pre_release_weight: Option<u32>,
}

impl BranchConfig {
    /// Fill unset fields from a parent configuration
    ///
    /// Pure: returns a new value and never overwrites a field that was
    /// explicitly set on `self`. An `Inherit` increment resolves from the
    /// parent's increment. Source-branch relations are identity of the
    /// entry itself and are not inherited.
    pub fn inherit(&self, parent: &BranchConfig) -> BranchConfig {
        BranchConfig {
            deployment_mode: self.deployment_mode.or(parent.deployment_mode),
            label: self.label.clone().or_else(|| parent.label.clone()),
            increment: if self.increment == IncrementStrategy::Inherit {
                parent.increment
            } else {
                self.increment
            },
            prevent_increment: self.prevent_increment.inherit(&parent.prevent_increment),
            track_merge_target: self.track_merge_target.or(parent.track_merge_target),
            track_merge_message: self.track_merge_message.or(parent.track_merge_message),
            commit_message_incrementing: self
                .commit_message_incrementing
                .or(parent.commit_message_incrementing),
            regex: self.regex.clone().or_else(|| parent.regex.clone()),
            source_branches: self.source_branches.clone(),
            is_source_branch_for: self.is_source_branch_for.clone(),
            tracks_release_branches: self
                .tracks_release_branches
                .or(parent.tracks_release_branches),
            is_release_branch: self.is_release_branch.or(parent.is_release_branch),
            is_main_branch: self.is_main_branch.or(parent.is_main_branch),
            pre_release_weight: self.pre_release_weight.or(parent.pre_release_weight),
        }
    }
}

fn default_tag_prefix() -> String {
    "[vV]?".to_string()
}

fn default_major_bump_message() -> String {
    r"\+semver:\s?(breaking|major)".to_string()
}

fn default_minor_bump_message() -> String {
    r"\+semver:\s?(feature|minor)".to_string()
}

fn default_patch_bump_message() -> String {
    r"\+semver:\s?(fix|patch)".to_string()
}

fn default_no_bump_message() -> String {
    r"\+semver:\s?(none|skip)".to_string()
}

fn default_label() -> String {
    "{BranchName}".to_string()
}

/// Returns the default GitFlow-style branch entries.
///
/// Declaration order matters: branch resolution takes the first entry whose
/// regex matches.
fn default_branches() -> IndexMap<String, BranchConfig> {
    let mut branches = IndexMap::new();
    branches.insert(
        "main".to_string(),
        BranchConfig {
            regex: Some("^master$|^main$".to_string()),
            label: Some(String::new()),
            increment: IncrementStrategy::Patch,
            is_main_branch: Some(true),
            prevent_increment: PreventIncrementConfig {
                of_merged_branch: Some(true),
                when_current_commit_tagged: Some(false),
                ..Default::default()
            },
            track_merge_target: Some(false),
            tracks_release_branches: Some(false),
            is_release_branch: Some(false),
            pre_release_weight: Some(55000),
            source_branches: vec!["develop".to_string(), "release".to_string()],
            ..Default::default()
        },
    );
    branches.insert(
        "develop".to_string(),
        BranchConfig {
            regex: Some("^dev(elop)?(ment)?$".to_string()),
            label: Some("alpha".to_string()),
            increment: IncrementStrategy::Minor,
            tracks_release_branches: Some(true),
            is_main_branch: Some(false),
            is_release_branch: Some(false),
            track_merge_target: Some(true),
            track_merge_message: Some(true),
            source_branches: vec!["main".to_string()],
            ..Default::default()
        },
    );
    branches.insert(
        "release".to_string(),
        BranchConfig {
            regex: Some(r"^releases?[/-]".to_string()),
            label: Some("beta".to_string()),
            increment: IncrementStrategy::None,
            is_release_branch: Some(true),
            is_main_branch: Some(false),
            tracks_release_branches: Some(false),
            pre_release_weight: Some(30000),
            prevent_increment: PreventIncrementConfig {
                of_merged_branch: Some(true),
                when_current_commit_tagged: Some(false),
                ..Default::default()
            },
            source_branches: vec![
                "develop".to_string(),
                "main".to_string(),
                "release".to_string(),
            ],
            ..Default::default()
        },
    );
    branches.insert(
        "feature".to_string(),
        BranchConfig {
            regex: Some(r"^features?[/-]".to_string()),
            label: Some("{BranchName}".to_string()),
            increment: IncrementStrategy::Inherit,
            source_branches: vec![
                "develop".to_string(),
                "main".to_string(),
                "release".to_string(),
                "feature".to_string(),
                "hotfix".to_string(),
            ],
            ..Default::default()
        },
    );
    branches.insert(
        "hotfix".to_string(),
        BranchConfig {
            regex: Some(r"^hotfix(es)?[/-]".to_string()),
            label: Some("beta".to_string()),
            increment: IncrementStrategy::Inherit,
            is_release_branch: Some(true),
            source_branches: vec!["main".to_string(), "support".to_string()],
            ..Default::default()
        },
    );
    branches.insert(
        "support".to_string(),
        BranchConfig {
            regex: Some(r"^support[/-]".to_string()),
            label: Some(String::new()),
            increment: IncrementStrategy::Patch,
            is_main_branch: Some(true),
            source_branches: vec!["main".to_string()],
            ..Default::default()
        },
    );
    branches.insert(
        "pull-request".to_string(),
        BranchConfig {
            regex: Some(r"^(pull|pull\-requests|pr)[/-]".to_string()),
            label: Some("PullRequest".to_string()),
            increment: IncrementStrategy::Inherit,
            source_branches: vec![
                "develop".to_string(),
                "main".to_string(),
                "release".to_string(),
                "feature".to_string(),
                "hotfix".to_string(),
            ],
            ..Default::default()
        },
    );
    branches
}

/// Complete gitver configuration: global settings plus branch entries
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GitVerConfig {
    /// Regex pattern for the tag prefix (matched case-insensitively)
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default)]
    pub deployment_mode: DeploymentMode,

    /// Global label template; `{BranchName}` expands to the branch name
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default)]
    pub increment: IncrementStrategy,

    #[serde(default)]
    pub commit_message_incrementing: CommitMessageIncrementMode,

    #[serde(default = "default_major_bump_message")]
    pub major_version_bump_message: String,

    #[serde(default = "default_minor_bump_message")]
    pub minor_version_bump_message: String,

    #[serde(default = "default_patch_bump_message")]
    pub patch_version_bump_message: String,

    #[serde(default = "default_no_bump_message")]
    pub no_bump_message: String,

    /// Custom merge message formats, tried before the built-ins in
    /// declaration order
    #[serde(default)]
    pub merge_message_formats: IndexMap<String, String>,

    /// Branch configuration entries, first regex match wins
    #[serde(default = "default_branches")]
    pub branches: IndexMap<String, BranchConfig>,
}

impl Default for GitVerConfig {
    fn default() -> Self {
        GitVerConfig {
            tag_prefix: default_tag_prefix(),
            deployment_mode: DeploymentMode::default(),
            label: default_label(),
            increment: IncrementStrategy::Inherit,
            commit_message_incrementing: CommitMessageIncrementMode::default(),
            major_version_bump_message: default_major_bump_message(),
            minor_version_bump_message: default_minor_bump_message(),
            patch_version_bump_message: default_patch_bump_message(),
            no_bump_message: default_no_bump_message(),
            merge_message_formats: IndexMap::new(),
            branches: default_branches(),
        }
    }
}

impl GitVerConfig {
    /// Resolve the best-matching branch configuration for a branch name
    ///
    /// Entries are tried in declaration order; the first whose regex
    /// matches wins. A missing regex on an entry skips it. When nothing
    /// matches, an empty configuration (inheriting everything) is returned.
    ///
    /// # Errors
    /// A malformed regex in the configuration is a usage error.
    pub fn branch_configuration(&self, branch_name: &str) -> Result<BranchConfig> {
        for (name, branch) in &self.branches {
            let Some(pattern) = &branch.regex else {
                continue;
            };
            let re = Regex::new(pattern).map_err(|e| {
                GitVerError::config(format!("Invalid regex for branch '{}': {}", name, e))
            })?;
            if re.is_match(branch_name) {
                return Ok(branch.clone());
            }
        }
        Ok(BranchConfig::default())
    }

    /// Global settings expressed as a parent branch configuration
    pub fn global_branch_defaults(&self) -> BranchConfig {
        BranchConfig {
            deployment_mode: Some(self.deployment_mode),
            label: Some(self.label.clone()),
            increment: self.increment,
            commit_message_incrementing: Some(self.commit_message_incrementing),
            ..Default::default()
        }
    }
}

/// Fully resolved configuration for one branch; every field defaulted.
///
/// Computed lazily per branch lookup, not cached across calculation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub deployment_mode: DeploymentMode,
    pub label: String,
    pub increment: IncrementStrategy,
    pub prevent_increment_of_merged_branch: bool,
    pub prevent_increment_when_branch_merged: bool,
    pub prevent_increment_when_current_commit_tagged: bool,
    pub track_merge_target: bool,
    pub track_merge_message: bool,
    pub commit_message_incrementing: CommitMessageIncrementMode,
    pub tracks_release_branches: bool,
    pub is_release_branch: bool,
    pub is_main_branch: bool,
    pub pre_release_weight: u32,
}

impl EffectiveConfig {
    /// Merge global settings and a matched branch configuration
    pub fn new(config: &GitVerConfig, branch: &BranchConfig) -> Self {
        let resolved = branch.inherit(&config.global_branch_defaults());
        let increment = match resolved.increment {
            // An unresolvable Inherit bottoms out at Patch
            IncrementStrategy::Inherit => IncrementStrategy::Patch,
            other => other,
        };
        EffectiveConfig {
            deployment_mode: resolved.deployment_mode.unwrap_or_default(),
            label: resolved.label.unwrap_or_default(),
            increment,
            prevent_increment_of_merged_branch: resolved
                .prevent_increment
                .of_merged_branch
                .unwrap_or(false),
            prevent_increment_when_branch_merged: resolved
                .prevent_increment
                .when_branch_merged
                .unwrap_or(false),
            prevent_increment_when_current_commit_tagged: resolved
                .prevent_increment
                .when_current_commit_tagged
                .unwrap_or(true),
            track_merge_target: resolved.track_merge_target.unwrap_or(false),
            track_merge_message: resolved.track_merge_message.unwrap_or(true),
            commit_message_incrementing: resolved.commit_message_incrementing.unwrap_or_default(),
            tracks_release_branches: resolved.tracks_release_branches.unwrap_or(false),
            is_release_branch: resolved.is_release_branch.unwrap_or(false),
            is_main_branch: resolved.is_main_branch.unwrap_or(false),
            pre_release_weight: resolved.pre_release_weight.unwrap_or(0),
        }
    }

    /// Resolve the configured label for a concrete branch name
    ///
    /// Expands the `{BranchName}` placeholder and sanitizes the result into
    /// a valid pre-release label. An empty label means "stable" and
    /// resolves to `None`.
    pub fn branch_specific_label(&self, branch_name: &str) -> Option<String> {
        let expanded = self.label.replace("{BranchName}", branch_name);
        let sanitized: String = expanded
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
            .collect();
        if sanitized.is_empty() {
            None
        } else {
            Some(sanitized)
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitver.toml` in current directory
/// 3. `gitver.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(GitVerConfig)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<GitVerConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./gitver.toml").exists() {
        fs::read_to_string("./gitver.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("gitver.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(GitVerConfig::default());
        }
    } else {
        return Ok(GitVerConfig::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| GitVerError::config(format!("Cannot parse configuration: {}", e)))
}
