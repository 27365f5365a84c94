//! Calculation state carried along the trunk walk
//!
//! [MainlineContext] is owned exclusively by the single traversal; rules
//! mutate it and snapshot candidates out of it. Candidates are compared
//! after the walk, so emitting one never commits the calculation to it.

use crate::config::IncrementStrategy;
use crate::domain::{CommitId, SemanticVersion};

/// A candidate base version emitted by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseVersionIncrement {
    /// Name of the rule that emitted the candidate
    pub source: &'static str,
    /// Commit the base version was taken from, when one was established
    pub base_version_source: Option<CommitId>,
    pub base_version: SemanticVersion,
    pub increment: IncrementStrategy,
    /// A forced increment applies even when an alternative version is higher
    pub force_increment: bool,
    pub label: Option<String>,
    /// Highest alternative version known when the candidate was emitted
    pub alternative_semantic_version: Option<SemanticVersion>,
}

impl BaseVersionIncrement {
    /// The version this candidate resolves to, before labelling
    ///
    /// The base is incremented by the accumulated strategy; a higher
    /// alternative version wins unless the increment is forced.
    pub fn resulting_version(&self) -> SemanticVersion {
        let incremented = self.base_version.increment(self.increment);
        match &self.alternative_semantic_version {
            Some(alt) if !self.force_increment && *alt > incremented => alt.clone(),
            _ => incremented,
        }
    }
}

/// Accumulator for one trunk traversal
#[derive(Debug, Clone)]
pub struct MainlineContext {
    pub base_version_source: Option<CommitId>,
    pub base_version: SemanticVersion,
    /// Highest increment accumulated since the base version
    pub increment: IncrementStrategy,
    pub force_increment: bool,
    pub label: Option<String>,
    pub alternative_semantic_versions: Vec<SemanticVersion>,
}

impl MainlineContext {
    pub fn new() -> Self {
        MainlineContext {
            base_version_source: None,
            base_version: SemanticVersion::new(0, 0, 0),
            increment: IncrementStrategy::None,
            force_increment: false,
            label: None,
            alternative_semantic_versions: Vec::new(),
        }
    }

    /// Reset the context onto a new base version
    ///
    /// Everything accumulated before the base commit no longer contributes.
    pub fn rebase(&mut self, source: CommitId, version: SemanticVersion) {
        self.base_version_source = Some(source);
        self.base_version = version;
        self.increment = IncrementStrategy::None;
        self.force_increment = false;
        self.label = None;
        self.alternative_semantic_versions.clear();
    }

    /// Raise the accumulated increment, never lowering it
    pub fn accumulate_increment(&mut self, increment: IncrementStrategy) {
        if increment > self.increment {
            self.increment = increment;
        }
    }

    pub fn add_alternative(&mut self, version: SemanticVersion) {
        self.alternative_semantic_versions.push(version);
    }

    /// The canonical alternative is the maximum, never the first seen
    pub fn max_alternative(&self) -> Option<&SemanticVersion> {
        self.alternative_semantic_versions.iter().max()
    }

    /// Snapshot the current state as a candidate
    pub fn candidate(&self, source: &'static str) -> BaseVersionIncrement {
        BaseVersionIncrement {
            source,
            base_version_source: self.base_version_source.clone(),
            base_version: self.base_version.clone(),
            increment: self.increment,
            force_increment: self.force_increment,
            label: self.label.clone(),
            alternative_semantic_version: self.max_alternative().cloned(),
        }
    }
}

impl Default for MainlineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_new_context_has_zero_base() {
        let ctx = MainlineContext::new();
        assert_eq!(ctx.base_version, SemanticVersion::new(0, 0, 0));
        assert_eq!(ctx.base_version_source, None);
        assert_eq!(ctx.increment, IncrementStrategy::None);
    }

    #[test]
    fn test_accumulate_increment_keeps_highest() {
        let mut ctx = MainlineContext::new();
        ctx.accumulate_increment(IncrementStrategy::Minor);
        ctx.accumulate_increment(IncrementStrategy::Patch);
        assert_eq!(ctx.increment, IncrementStrategy::Minor);
        ctx.accumulate_increment(IncrementStrategy::Major);
        assert_eq!(ctx.increment, IncrementStrategy::Major);
    }

    #[test]
    fn test_rebase_clears_accumulated_state() {
        let mut ctx = MainlineContext::new();
        ctx.accumulate_increment(IncrementStrategy::Major);
        ctx.add_alternative(version("0.5.0"));
        ctx.rebase(CommitId::new("abc"), version("1.0.0"));

        assert_eq!(ctx.base_version, version("1.0.0"));
        assert_eq!(ctx.base_version_source, Some(CommitId::new("abc")));
        assert_eq!(ctx.increment, IncrementStrategy::None);
        assert!(ctx.alternative_semantic_versions.is_empty());
    }

    #[test]
    fn test_max_alternative_is_canonical() {
        let mut ctx = MainlineContext::new();
        ctx.add_alternative(version("2.0.0"));
        ctx.add_alternative(version("1.0.0"));
        ctx.add_alternative(version("1.5.0"));
        assert_eq!(ctx.max_alternative(), Some(&version("2.0.0")));
    }

    #[test]
    fn test_resulting_version_increments_base() {
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("abc"), version("1.0.0"));
        ctx.accumulate_increment(IncrementStrategy::Minor);
        assert_eq!(ctx.candidate("test").resulting_version(), version("1.1.0"));
    }

    #[test]
    fn test_resulting_version_prefers_higher_alternative() {
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("abc"), version("1.0.0"));
        ctx.accumulate_increment(IncrementStrategy::Patch);
        ctx.add_alternative(version("2.0.0"));
        assert_eq!(ctx.candidate("test").resulting_version(), version("2.0.0"));
    }

    #[test]
    fn test_forced_increment_beats_alternative() {
        let mut ctx = MainlineContext::new();
        ctx.rebase(CommitId::new("abc"), version("1.0.0"));
        ctx.accumulate_increment(IncrementStrategy::Patch);
        ctx.add_alternative(version("2.0.0"));
        ctx.force_increment = true;
        assert_eq!(ctx.candidate("test").resulting_version(), version("1.0.1"));
    }
}
