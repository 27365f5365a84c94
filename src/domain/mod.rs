//! Domain logic - pure value types independent of git operations

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{friendly_branch_name, Branch};
pub use commit::{Commit, CommitId};
pub use prerelease::PreRelease;
pub use tag::{SemanticVersionWithTag, Tag};
pub use version::SemanticVersion;
