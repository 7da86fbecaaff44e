//! Durable snapshot cache.
//!
//! [`CacheStore`] persists the whole discovered tree, snapshots included, as one
//! human-readable JSON document so the next start can show results before any
//! `git` call finishes.
//!
//! # Guarantees
//! - **Atomic writes**: the record is written to a temporary file in the cache
//!   directory and renamed over the target, so a crash never leaves half a file
//! - **Throttling**: unforced writes closer together than the configured interval
//!   are skipped; the check and the write happen under the same lock
//! - **Monotonic**: a record stamped earlier than the one last written is never
//!   written, forced or not
//! - **Soft failures**: a missing or unparsable cache loads as "no cache"
//! - **Validation**: a record only counts if it was built for the same root path
//!   set and is younger than the allowed age

use crate::core::error::{GitFleetError, Result};
use crate::core::state::{CacheRecord, TreeNode};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Bumped whenever the persisted tree shape changes incompatibly
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    Throttled,
    Superseded,
}

#[derive(Debug, Default)]
struct WriteState {
    at: Option<Instant>,
    newest: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    min_write_interval: Duration,
    last_write: Mutex<WriteState>,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>, min_write_interval: Duration) -> Self {
        Self {
            path: path.into(),
            min_write_interval,
            last_write: Mutex::new(WriteState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a record for the current tree and root path set
    pub fn record_for(root_paths: &[PathBuf], tree: Vec<TreeNode>) -> CacheRecord {
        CacheRecord {
            version: CACHE_VERSION,
            root_paths_fingerprint: fingerprint(root_paths),
            timestamp: Utc::now(),
            tree,
        }
    }

    /// Read the cache file, reporting exactly why it could not be used
    pub fn read(&self) -> Result<CacheRecord> {
        if !self.path.exists() {
            return Err(GitFleetError::cache_file_not_found(&self.path));
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| GitFleetError::cache_read_failed(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| GitFleetError::cache_corrupt(&self.path, e))
    }

    /// Load the cache; absence and corruption both mean "no cache"
    pub fn load(&self) -> Option<CacheRecord> {
        match self.read() {
            Ok(record) => {
                log::debug!(
                    "Loaded cache from {} ({} roots)",
                    self.path.display(),
                    record.tree.len()
                );
                Some(record)
            }
            Err(GitFleetError::CacheFileNotFound { .. }) => {
                log::debug!("No cache at {}", self.path.display());
                None
            }
            Err(e) => {
                log::warn!("Ignoring unusable cache: {e}");
                None
            }
        }
    }

    pub fn save(&self, record: &CacheRecord, force: bool) -> Result<SaveOutcome> {
        let mut last_write = self
            .last_write
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if last_write.newest.is_some_and(|newest| record.timestamp < newest) {
            log::debug!(
                "Skipping cache write, record from {} is older than the cached tree",
                record.timestamp
            );
            return Ok(SaveOutcome::Superseded);
        }

        if !force {
            if let Some(previous) = last_write.at {
                if previous.elapsed() < self.min_write_interval {
                    log::debug!(
                        "Skipping cache write, last write {:?} ago",
                        previous.elapsed()
                    );
                    return Ok(SaveOutcome::Throttled);
                }
            }
        }

        self.write_atomically(record)?;
        last_write.at = Some(Instant::now());
        last_write.newest = Some(record.timestamp);
        log::debug!("Cache written to {}", self.path.display());
        Ok(SaveOutcome::Written)
    }

    fn write_atomically(&self, record: &CacheRecord) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if let Err(e) = fs::create_dir_all(dir) {
            log::error!("Failed to create cache directory '{}': {}", dir.display(), e);
            return Err(GitFleetError::cache_directory_creation_failed(dir, e));
        }

        let json = serde_json::to_string_pretty(record).map_err(|e| {
            log::error!("Failed to serialize cache data: {e}");
            GitFleetError::cache_serialization_failed(e)
        })?;

        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| GitFleetError::cache_write_failed(&self.path, e))?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| GitFleetError::cache_write_failed(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| GitFleetError::cache_write_failed(&self.path, e.error))?;
        Ok(())
    }

    /// Check a record against the current configuration.
    ///
    /// Not an error in the failure sense: `CacheInvalid` is the routine signal
    /// to fall back to a full scan.
    pub fn validate(
        &self,
        record: &CacheRecord,
        current_root_paths: &[PathBuf],
        max_age: Duration,
    ) -> Result<()> {
        if record.version != CACHE_VERSION {
            return Err(GitFleetError::cache_invalid(format!(
                "schema version {} != {}",
                record.version, CACHE_VERSION
            )));
        }
        if record.root_paths_fingerprint != fingerprint(current_root_paths) {
            return Err(GitFleetError::cache_invalid("monitored root paths changed"));
        }
        let age = Utc::now().signed_duration_since(record.timestamp);
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        if age > max_age {
            return Err(GitFleetError::cache_invalid(format!(
                "cache is {}s old",
                age.num_seconds()
            )));
        }
        Ok(())
    }

    pub fn is_valid(
        &self,
        record: &CacheRecord,
        current_root_paths: &[PathBuf],
        max_age: Duration,
    ) -> bool {
        match self.validate(record, current_root_paths, max_age) {
            Ok(()) => true,
            Err(e) => {
                log::info!("{e}");
                false
            }
        }
    }
}

/// Order-independent digest of a root path set
pub fn fingerprint(root_paths: &[PathBuf]) -> String {
    let unique: BTreeSet<String> = root_paths
        .iter()
        .map(|p| p.to_string_lossy().trim_end_matches('/').to_string())
        .collect();
    let joined = unique.into_iter().collect::<Vec<_>>().join("\n");
    format!("{:x}", md5::compute(joined.as_bytes()))
}
