// tests/mainline_test.rs
use chrono::{DateTime, TimeZone, Utc};
use gitver::config::GitVerConfig;
use gitver::domain::{Branch, CommitId};
use gitver::git::{MockRepository, Repository};
use gitver::mainline::MainlineVersionCalculator;

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap()
}

fn calculate(repo: &MockRepository, branch: &str) -> gitver::mainline::CalculatedVersion {
    let config = GitVerConfig::default();
    let branch = repo
        .branches()
        .unwrap()
        .into_iter()
        .find(|b| b.name == branch)
        .unwrap();
    MainlineVersionCalculator::new(repo, &config)
        .find_version(&branch)
        .unwrap()
}

#[test]
fn test_main_without_tags_starts_from_zero() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "more work", &["a"]);
    repo.set_branch("main", "b");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "0.0.1");
    assert_eq!(result.base_version_source, None);
    assert_eq!(result.commits_since_version_source, 2);
}

#[test]
fn test_main_increments_patch_past_last_tag() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "work", &["a"]);
    repo.set_branch("main", "b");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.0.1");
    assert_eq!(result.base_version_source, Some(CommitId::new("a")));
    assert_eq!(result.commits_since_version_source, 1);
}

#[test]
fn test_stable_tag_at_main_head_forces_increment() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "release commit", &[]);
    repo.set_branch("main", "a");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.0.1");
    assert_eq!(result.commits_since_version_source, 0);
}

#[test]
fn test_latest_stable_tag_wins_over_older_higher_activity() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "second release", &["a"]);
    repo.add_commit("c", at(2), "work", &["b"]);
    repo.set_branch("main", "c");
    repo.add_tag("v1.0.0", "a");
    repo.add_tag("v1.1.0", "b");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.1.1");
    assert_eq!(result.base_version_source, Some(CommitId::new("b")));
}

#[test]
fn test_develop_gets_minor_increment_and_alpha_label() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "feature work", &["a"]);
    repo.set_branch("develop", "b");
    repo.set_branch("main", "a");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "develop");
    assert_eq!(result.version.to_string(), "1.1.0-alpha.1");
}

#[test]
fn test_pre_release_tag_at_head_is_returned_as_is() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "tagged prerelease", &["a"]);
    repo.set_branch("develop", "b");
    repo.add_tag("v1.1.0-alpha.1", "b");

    // develop keeps the default prevent-increment-when-tagged behavior
    let result = calculate(&repo, "develop");
    assert_eq!(result.version.to_string(), "1.1.0-alpha.1");
}

#[test]
fn test_pre_release_tag_at_main_head_is_not_forced() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "release candidate", &[]);
    repo.set_branch("main", "a");
    repo.add_tag("v1.0.0-rc.1", "a");

    // Unlike a stable tag, a pre-release tag at the head never forces an
    // increment; the tag version wins as the highest alternative
    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.0.0-rc.1");
}

#[test]
fn test_release_branch_continues_beta_numbering() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "start release", &[]);
    repo.set_branch("release/1.0.0", "a");
    repo.add_tag("v1.0.0-beta.1", "a");

    // release does not prevent incrementing a tagged head; its label picks
    // up where the tag left off
    let result = calculate(&repo, "release/1.0.0");
    assert_eq!(result.version.to_string(), "1.0.0-beta.2");
}

#[test]
fn test_merged_release_branch_version_is_taken_on_main() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("x", at(1), "release prep", &["a"]);
    repo.add_commit("m", at(2), "Merge branch 'release/2.0.0'", &["a", "x"]);
    repo.set_branch("main", "m");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "2.0.0");
}

#[test]
fn test_semver_directive_raises_increment() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "Rewrite storage layer +semver: major", &["a"]);
    repo.add_commit("c", at(2), "cleanup", &["b"]);
    repo.set_branch("main", "c");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "2.0.0");
}

#[test]
fn test_semver_directive_on_head_commit() {
    let mut repo = MockRepository::new();
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(1), "Add export endpoint +semver: feature", &["a"]);
    repo.set_branch("main", "b");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.1.0");
}

#[test]
fn test_tag_after_head_timestamp_is_ignored() {
    let mut repo = MockRepository::new();
    // Clock skew: b carries a timestamp newer than the head
    repo.add_commit("a", at(0), "initial", &[]);
    repo.add_commit("b", at(5), "future release", &["a"]);
    repo.add_commit("c", at(2), "head", &["b"]);
    repo.set_branch("main", "c");
    repo.add_tag("v9.0.0", "b");
    repo.add_tag("v1.0.0", "a");

    let result = calculate(&repo, "main");
    assert_eq!(result.version.to_string(), "1.0.1");
}

#[test]
fn test_branch_without_commits_is_an_error() {
    let repo = MockRepository::new();
    let config = GitVerConfig::default();
    let branch = Branch::new("main", None);
    let result = MainlineVersionCalculator::new(&repo, &config).find_version(&branch);
    assert!(result.is_err());
}
