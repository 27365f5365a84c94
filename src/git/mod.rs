//! Git access abstraction layer
//!
//! The calculation engine consumes the read-only [Repository] trait rather
//! than git2 directly. Concrete implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! The engine never mutates the repository through this trait; it only reads
//! commits, branches, and tags.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::{Branch, Commit, CommitId, Tag};
use crate::error::Result;
use std::path::Path;

/// Read-only git repository access
///
/// All implementors must be `Send + Sync`. Methods return
/// [crate::error::Result] and map underlying errors (like `git2::Error`)
/// to [crate::error::GitVerError] variants.
pub trait Repository: Send + Sync {
    /// The currently checked-out branch
    fn head_branch(&self) -> Result<Branch>;

    /// All local branches
    fn branches(&self) -> Result<Vec<Branch>>;

    /// All tags with their (peeled) target commits
    fn tags(&self) -> Result<Vec<Tag>>;

    /// Look up a single commit by id
    ///
    /// # Returns
    /// * `Ok(Some(Commit))` - The commit exists
    /// * `Ok(None)` - No such commit
    fn find_commit(&self, id: &CommitId) -> Result<Option<Commit>>;

    /// First-parent lineage starting at `tip`, newest first
    ///
    /// This is the trunk walk: merge side-branches contribute only their
    /// merge commits.
    fn first_parent_history(&self, tip: &CommitId) -> Result<Vec<Commit>>;

    /// Full reachable history starting at `tip`, newest first
    fn history(&self, tip: &CommitId) -> Result<Vec<Commit>>;

    /// The repository metadata directory (`.git`)
    ///
    /// Used to derive the cache location and the cross-process lock name.
    fn git_dir(&self) -> &Path;
}
