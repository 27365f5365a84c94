//! Cross-process repository lock
//!
//! Two processes computing versions for the same repository must not race
//! each other on the cache. The lock is a file in the OS temp directory
//! whose name is derived from the repository's metadata path, created with
//! `create_new` so acquisition is atomic, and removed on drop. Scope is
//! per-repository, not per-branch.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// A lock left behind by a crashed process is reclaimed after this long
const STALE_LOCK_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    acquired_at: DateTime<Utc>,
}

/// Held for the duration of a calculation; released on drop
#[derive(Debug)]
pub struct RepositoryLock {
    path: PathBuf,
}

impl RepositoryLock {
    /// Block until the repository lock is acquired
    ///
    /// Stale lock files older than [STALE_LOCK_TIMEOUT] are removed and
    /// acquisition retried.
    pub fn acquire_blocking(git_dir: &Path) -> Result<RepositoryLock> {
        let path = lock_path(git_dir);

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let info = LockInfo {
                        pid: std::process::id(),
                        acquired_at: Utc::now(),
                    };
                    if let Ok(json) = serde_json::to_string(&info) {
                        let _ = file.write_all(json.as_bytes());
                    }
                    debug!(path = %path.display(), "repository lock acquired");
                    return Ok(RepositoryLock { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        warn!(path = %path.display(), "removing stale repository lock");
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for RepositoryLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release repository lock");
        }
    }
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .and_then(|modified| modified.elapsed().map_err(|e| std::io::Error::other(e)))
        .map(|age| age > STALE_LOCK_TIMEOUT)
        .unwrap_or(false)
}

/// Lock file path for a repository, derived from its metadata directory
///
/// Path separators and drive colons are flattened so the repository path
/// becomes a single file name.
fn lock_path(git_dir: &Path) -> PathBuf {
    let sanitized: String = git_dir
        .to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    std::env::temp_dir().join(format!("gitver-{}.lock", sanitized))
}
