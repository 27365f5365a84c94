use crate::domain::commit::CommitId;
use crate::domain::version::SemanticVersion;

/// Represents a git tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: CommitId,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, target: CommitId) -> Self {
        Tag {
            name: name.into(),
            target,
        }
    }
}

/// A semantic version together with its originating tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersionWithTag {
    pub version: SemanticVersion,
    pub tag: Tag,
}

impl SemanticVersionWithTag {
    pub fn new(version: SemanticVersion, tag: Tag) -> Self {
        SemanticVersionWithTag { version, tag }
    }

    /// Whether this entry matches a branch-specific label filter
    ///
    /// Stable versions match any filter; pre-release versions match only
    /// when no label is requested or the labels agree.
    pub fn is_match_for_branch_specific_label(&self, label: Option<&str>) -> bool {
        match &self.version.pre_release {
            None => true,
            Some(pre) => pre.matches_label(label),
        }
    }
}

impl PartialOrd for SemanticVersionWithTag {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersionWithTag {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.tag.name.cmp(&other.tag.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> SemanticVersionWithTag {
        SemanticVersionWithTag::new(
            SemanticVersion::parse(version).unwrap(),
            Tag::new(format!("v{}", version), CommitId::new("abc")),
        )
    }

    #[test]
    fn test_stable_matches_any_label() {
        let e = entry("1.0.0");
        assert!(e.is_match_for_branch_specific_label(None));
        assert!(e.is_match_for_branch_specific_label(Some("beta")));
    }

    #[test]
    fn test_pre_release_matches_same_label() {
        let e = entry("1.0.0-beta.1");
        assert!(e.is_match_for_branch_specific_label(None));
        assert!(e.is_match_for_branch_specific_label(Some("beta")));
        assert!(!e.is_match_for_branch_specific_label(Some("alpha")));
    }

    #[test]
    fn test_ordering_follows_version() {
        assert!(entry("1.1.0") > entry("1.0.0"));
        assert!(entry("1.0.0") > entry("1.0.0-rc.1"));
    }
}
