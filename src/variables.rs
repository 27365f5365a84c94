//! Flattened output payload
//!
//! [VersionVariables] is the immutable record handed to consumers and the
//! cache. Field names serialize in PascalCase to match the conventional
//! variable names CI pipelines expect.

use crate::domain::{Commit, CommitId, SemanticVersion};
use serde::{Deserialize, Serialize};

/// All computed variables for one calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionVariables {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub major_minor_patch: String,
    pub pre_release_label: Option<String>,
    pub pre_release_number: Option<u32>,
    pub pre_release_tag: Option<String>,
    /// Version without build metadata
    pub sem_ver: String,
    /// Version including build metadata
    pub full_sem_ver: String,
    pub build_metadata: Option<String>,
    pub branch_name: String,
    pub sha: String,
    pub short_sha: String,
    pub commit_date: String,
    pub version_source_sha: Option<String>,
    pub commits_since_version_source: u32,
}

impl VersionVariables {
    /// Build the variable set from a computed version and head data
    pub fn from_parts(
        version: &SemanticVersion,
        branch_name: &str,
        head: &Commit,
        version_source: Option<&CommitId>,
        commits_since_version_source: u32,
    ) -> Self {
        let major_minor_patch = format!("{}.{}.{}", version.major, version.minor, version.patch);
        let pre_release_tag = version.pre_release.as_ref().map(|p| p.to_string());
        let sem_ver = match &pre_release_tag {
            Some(tag) => format!("{}-{}", major_minor_patch, tag),
            None => major_minor_patch.clone(),
        };

        VersionVariables {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            major_minor_patch,
            pre_release_label: version.pre_release.as_ref().map(|p| p.label.clone()),
            pre_release_number: version.pre_release.as_ref().and_then(|p| p.number),
            pre_release_tag,
            sem_ver,
            full_sem_ver: version.to_string(),
            build_metadata: version.build_metadata.clone(),
            branch_name: branch_name.to_string(),
            sha: head.id.0.clone(),
            short_sha: head.id.short().to_string(),
            commit_date: head.when.format("%Y-%m-%d").to_string(),
            version_source_sha: version_source.map(|id| id.0.clone()),
            commits_since_version_source,
        }
    }

    /// Look up a single variable by its serialized (PascalCase) name
    ///
    /// Lookup is case-insensitive. Unset optional variables resolve to an
    /// empty string; an unknown name yields `None`.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        let map = value.as_object()?;
        let (_, value) = map
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(match value {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
