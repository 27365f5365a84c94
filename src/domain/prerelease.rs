//! Pre-release tag handling for semantic versioning
//!
//! A pre-release tag is a label plus an optional number ("beta.1", "rc.2",
//! "alpha"). Ordering follows semver.org precedence: labels compare
//! lexically and an absent number sorts below any number.

use crate::error::{GitVerError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release component of a semantic version
///
/// # Examples
/// - "alpha" -> PreRelease { label: "alpha", number: None }
/// - "beta.1" -> PreRelease { label: "beta", number: Some(1) }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreRelease {
    /// The pre-release label (e.g., "alpha", "beta", "rc")
    pub label: String,
    /// Optional number, incremented per release cycle
    pub number: Option<u32>,
}

impl PreRelease {
    /// Create a new pre-release tag
    pub fn new(label: impl Into<String>, number: Option<u32>) -> Self {
        PreRelease {
            label: label.into(),
            number,
        }
    }

    /// Parse a pre-release tag from a string
    ///
    /// Accepts formats like "beta", "beta.1", "rc.2", or "dev.5". A purely
    /// numeric input becomes an empty label with a number ("1" -> {"", 1}).
    ///
    /// # Returns
    /// * `Ok(PreRelease)` - Parsed pre-release tag
    /// * `Err` - If the input is empty or contains invalid characters
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Increment the number, starting at 1 when absent
    pub fn increment_number(&self) -> Self {
        PreRelease {
            label: self.label.clone(),
            number: Some(self.number.map_or(1, |n| n + 1)),
        }
    }

    /// Whether the label matches a branch-specific label filter
    ///
    /// An absent filter matches everything; otherwise the comparison is
    /// case-insensitive.
    pub fn matches_label(&self, label: Option<&str>) -> bool {
        match label {
            None => true,
            Some(label) => self.label.eq_ignore_ascii_case(label),
        }
    }
}

impl FromStr for PreRelease {
    type Err = GitVerError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(GitVerError::version("Empty pre-release tag".to_string()));
        }

        let valid = |part: &str| {
            part.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        };

        let (label, number) = match s.rsplit_once('.') {
            Some((label, digits)) if digits.chars().all(|c| c.is_ascii_digit()) => {
                let number = digits.parse::<u32>().map_err(|_| {
                    GitVerError::version(format!("Invalid pre-release number: '{}'", digits))
                })?;
                (label.to_string(), Some(number))
            }
            _ if s.chars().all(|c| c.is_ascii_digit()) => {
                let number = s.parse::<u32>().map_err(|_| {
                    GitVerError::version(format!("Invalid pre-release number: '{}'", s))
                })?;
                (String::new(), Some(number))
            }
            _ => (s.to_string(), None),
        };

        if !valid(&label) {
            return Err(GitVerError::version(format!(
                "Invalid pre-release label: '{}'",
                s
            )));
        }

        Ok(PreRelease { label, number })
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        let label = self
            .label
            .to_ascii_lowercase()
            .cmp(&other.label.to_ascii_lowercase());
        if label != Ordering::Equal {
            return label;
        }
        // No number sorts below any number ("beta" < "beta.1")
        match (self.number, other.number) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label[..], self.number) {
            ("", Some(n)) => write!(f, "{}", n),
            ("", None) => Ok(()),
            (label, Some(n)) => write!(f, "{}.{}", label, n),
            (label, None) => write!(f, "{}", label),
        }
    }
}
