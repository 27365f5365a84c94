//! Semantic version value type
//!
//! Extends the major.minor.patch triple with an optional pre-release tag and
//! build metadata. A release outranks any pre-release of the same triple.

use crate::config::IncrementStrategy;
use crate::domain::prerelease::PreRelease;
use crate::error::{GitVerError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// Semantic version representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: Option<PreRelease>,
    pub build_metadata: Option<String>,
}

impl SemanticVersion {
    /// Create a new stable version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Attach a pre-release tag
    pub fn with_pre_release(mut self, pre_release: PreRelease) -> Self {
        self.pre_release = Some(pre_release);
        self
    }

    /// Whether this version carries no pre-release tag
    pub fn is_stable(&self) -> bool {
        self.pre_release.is_none()
    }

    /// Parse a version string (e.g., "1.2.3", "4.1", "1.0.0-beta.2+build.5")
    ///
    /// At least major and minor must be present; a missing patch defaults
    /// to zero.
    ///
    /// # Returns
    /// * `Some(SemanticVersion)` - Successfully parsed version
    /// * `None` - If the input is not a version
    pub fn parse(s: &str) -> Option<Self> {
        let (core, build_metadata) = match s.split_once('+') {
            Some((core, meta)) if !meta.is_empty() => (core, Some(meta.to_string())),
            Some(_) => return None,
            None => (s, None),
        };

        let (triple, pre_release) = match core.split_once('-') {
            Some((triple, pre)) => (triple, Some(PreRelease::parse(pre).ok()?)),
            None => (core, None),
        };

        let parts: Vec<&str> = triple.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return None;
        }

        let major = parts[0].parse::<u32>().ok()?;
        let minor = parts[1].parse::<u32>().ok()?;
        let patch = match parts.get(2) {
            Some(p) => p.parse::<u32>().ok()?,
            None => 0,
        };

        Some(SemanticVersion {
            major,
            minor,
            patch,
            pre_release,
            build_metadata,
        })
    }

    /// Parse a tag name under a configured prefix pattern
    ///
    /// The prefix pattern (e.g., `[vV]?`) is anchored at the start and
    /// matched case-insensitively; the remainder must parse as a version.
    ///
    /// # Arguments
    /// * `name` - Tag name (e.g., "v1.2.3")
    /// * `tag_prefix` - Regex pattern for the prefix to strip
    pub fn parse_tag(name: &str, tag_prefix: &str) -> Result<Self> {
        let stripped = strip_tag_prefix(name, tag_prefix)?;
        Self::parse(stripped).ok_or_else(|| {
            GitVerError::version(format!("Tag '{}' is not a semantic version", name))
        })
    }

    /// Apply an increment strategy, clearing pre-release and metadata
    pub fn increment(&self, strategy: IncrementStrategy) -> Self {
        let (major, minor, patch) = match strategy {
            IncrementStrategy::Major => (self.major + 1, 0, 0),
            IncrementStrategy::Minor => (self.major, self.minor + 1, 0),
            IncrementStrategy::Patch => (self.major, self.minor, self.patch + 1),
            IncrementStrategy::None | IncrementStrategy::Inherit => {
                (self.major, self.minor, self.patch)
            }
        };
        SemanticVersion::new(major, minor, patch)
    }
}

/// Strip a configured tag prefix from a tag name
///
/// Returns the remainder after the anchored, case-insensitive prefix match.
pub fn strip_tag_prefix<'a>(name: &'a str, tag_prefix: &str) -> Result<&'a str> {
    if tag_prefix.is_empty() {
        return Ok(name);
    }
    let re = Regex::new(&format!("^(?i:{})", tag_prefix))
        .map_err(|e| GitVerError::config(format!("Invalid tag prefix pattern: {}", e)))?;
    match re.find(name) {
        Some(m) => Ok(&name[m.end()..]),
        None => Ok(name),
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                // A release outranks any pre-release of the same triple
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.build_metadata.cmp(&other.build_metadata))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        if let Some(meta) = &self.build_metadata {
            write!(f, "+{}", meta)?;
        }
        Ok(())
    }
}
