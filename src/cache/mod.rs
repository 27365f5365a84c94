//! On-disk version cache
//!
//! A calculation is fully determined by the head commit, the branch, and
//! the configuration; those three are hashed into a fingerprint that keys
//! the cache entry. A stale entry can therefore never be served: any input
//! change produces a different fingerprint and misses.
//!
//! Cache failures are never fatal. A miss recomputes; a failed write is
//! logged and the computed result stands.

pub mod lock;

pub use lock::RepositoryLock;

use crate::config::GitVerConfig;
use crate::domain::CommitId;
use crate::error::{GitVerError, Result};
use crate::variables::VersionVariables;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bumped when the record layout changes; older records miss
const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    schema_version: u32,
    fingerprint: String,
    variables: VersionVariables,
}

/// Version cache for one (repository, head, branch, config) combination
pub struct VersionCache {
    path: PathBuf,
    fingerprint: String,
}

impl VersionCache {
    /// Prepare the cache entry for a calculation
    pub fn new(
        git_dir: &Path,
        head: &CommitId,
        branch_name: &str,
        config: &GitVerConfig,
    ) -> Result<VersionCache> {
        let fingerprint = fingerprint(head, branch_name, config)?;
        let path = git_dir
            .join("gitver")
            .join("cache")
            .join(format!("{}.json", fingerprint));
        Ok(VersionCache { path, fingerprint })
    }

    /// Load the cached variables, if any
    ///
    /// Absent files, unreadable records, schema mismatches, and fingerprint
    /// mismatches are all misses, never errors.
    pub fn load(&self) -> Option<VersionVariables> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %self.path.display(), "cache miss");
                return None;
            }
        };

        let record: CacheRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cache record, ignoring");
                return None;
            }
        };

        if record.schema_version != CACHE_SCHEMA_VERSION || record.fingerprint != self.fingerprint {
            debug!(path = %self.path.display(), "cache record does not match, ignoring");
            return None;
        }

        debug!(path = %self.path.display(), "cache hit");
        Some(record.variables)
    }

    /// Persist the computed variables
    ///
    /// The record is written to a temp file and renamed into place, so a
    /// concurrent reader sees either the old entry or the new one, never a
    /// partial write.
    pub fn store(&self, variables: &VersionVariables) -> Result<()> {
        let record = CacheRecord {
            schema_version: CACHE_SCHEMA_VERSION,
            fingerprint: self.fingerprint.clone(),
            variables: variables.clone(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| GitVerError::cache(format!("Cannot serialize cache record: {}", e)))?;

        let dir = self
            .path
            .parent()
            .ok_or_else(|| GitVerError::cache("Cache path has no parent".to_string()))?;
        fs::create_dir_all(dir)?;

        let tmp = self.path.with_extension(format!("tmp.{}", std::process::id()));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "cache record stored");
        Ok(())
    }
}

/// SHA-256 fingerprint over everything the calculation depends on
fn fingerprint(head: &CommitId, branch_name: &str, config: &GitVerConfig) -> Result<String> {
    let config_canonical = serde_json::to_string(config)
        .map_err(|e| GitVerError::cache(format!("Cannot canonicalize configuration: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(head.0.as_bytes());
    hasher.update([0]);
    hasher.update(branch_name.as_bytes());
    hasher.update([0]);
    hasher.update(config_canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
