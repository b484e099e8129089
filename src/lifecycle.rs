//! Soft-delete lifecycle
//!
//! `clear` never erases data outright: the target is renamed to a
//! `.deleted.<UTC timestamp>.<basename>` sibling. Only a previous deleted copy
//! with the very same name (same second) is purged permanently. Renames that
//! fail because another process briefly holds the path are retried a bounded
//! number of times with a fixed delay.
//!
//! The rename is not crash-safe: a crash between purging an old copy and
//! renaming the target leaves only the live target behind.

use crate::error::MetaError;
use crate::logging::Diagnostics;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const DELETED_PREFIX: &str = ".deleted.";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Retry policy for lifecycle operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    10
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_delay_ms > 60_000 {
            return Err(format!(
                "Retry delay must not exceed one minute: {}ms",
                self.retry_delay_ms
            ));
        }
        Ok(())
    }
}

/// A soft-deleted entry found next to live nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashEntry {
    pub path: PathBuf,
    pub deleted_at: DateTime<Utc>,
    /// Basename the entry had before it was cleared
    pub original: String,
}

impl TrashEntry {
    /// Parse a `.deleted.<timestamp>.<basename>` path
    pub fn parse(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let rest = name.strip_prefix(DELETED_PREFIX)?;
        let (stamp, original) = rest.split_once('.')?;
        if original.is_empty() {
            return None;
        }
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            deleted_at: Utc.from_utc_datetime(&naive),
            original: original.to_string(),
        })
    }
}

/// Name a cleared `basename` receives at `now`
pub fn deleted_name(basename: &str, now: DateTime<Utc>) -> String {
    format!("{}{}.{}", DELETED_PREFIX, now.format(TIMESTAMP_FORMAT), basename)
}

/// Raw OS error codes meaning "another process holds this path right now"
#[cfg(windows)]
const TRANSIENT_CODES: &[i32] = &[5, 32, 33];
#[cfg(not(windows))]
const TRANSIENT_CODES: &[i32] = &[16, 26];

fn is_transient(err: &io::Error) -> bool {
    err.raw_os_error()
        .map(|code| TRANSIENT_CODES.contains(&code))
        .unwrap_or(false)
}

/// Create/clear operations over physical paths
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    config: LifecycleConfig,
    diagnostics: Diagnostics,
}

impl Lifecycle {
    pub fn new(config: LifecycleConfig, diagnostics: Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Soft-delete `path`. Returns the deleted copy, or `None` if nothing existed.
    pub fn clear(&self, path: &Path) -> Result<Option<PathBuf>, MetaError> {
        self.clear_at(path, Utc::now())
    }

    /// [`clear`](Self::clear) with an explicit deletion timestamp
    pub fn clear_at(&self, path: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>, MetaError> {
        self.diagnostics.in_scope(|| {
            if fs::symlink_metadata(path).is_err() {
                warn!(path = %path.display(), "clear(): path did not exist");
                return Ok(None);
            }

            let basename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| MetaError::InvalidName(path.display().to_string()))?;
            let dirname = path.parent().unwrap_or_else(|| Path::new(""));
            let deleted = dirname.join(deleted_name(&basename, now));

            if fs::symlink_metadata(&deleted).is_ok() {
                self.with_retries(&deleted, || remove_entry(&deleted))?;
            }
            self.with_retries(path, || fs::rename(path, &deleted))?;

            info!(path = %path.display(), deleted = %deleted.display(), "clear(): removed");
            Ok(Some(deleted))
        })
    }

    /// Create a directory (and its ancestors)
    pub fn create_dir(&self, path: &Path) -> Result<(), MetaError> {
        self.diagnostics
            .in_scope(|| self.with_retries(path, || fs::create_dir_all(path)))
    }

    /// Soft-deleted entries directly inside `dir`, oldest first
    pub fn trash(&self, dir: &Path) -> Result<Vec<TrashEntry>, MetaError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if let Some(trash) = TrashEntry::parse(&entry.path()) {
                entries.push(trash);
            }
        }
        entries.sort_by(|a, b| a.deleted_at.cmp(&b.deleted_at).then(a.path.cmp(&b.path)));
        Ok(entries)
    }

    /// Permanently delete trash in `dir` cleared before `cutoff`
    pub fn purge_trash(&self, dir: &Path, cutoff: DateTime<Utc>) -> Result<Vec<PathBuf>, MetaError> {
        self.diagnostics.in_scope(|| {
            let mut purged = Vec::new();
            for entry in self.trash(dir)? {
                if entry.deleted_at >= cutoff {
                    continue;
                }
                self.with_retries(&entry.path, || remove_entry(&entry.path))?;
                info!(path = %entry.path.display(), "Purged deleted copy");
                purged.push(entry.path);
            }
            Ok(purged)
        })
    }

    /// Run `op`, retrying transient lock failures with a fixed delay
    fn with_retries<T>(
        &self,
        path: &Path,
        mut op: impl FnMut() -> io::Result<T>,
    ) -> Result<T, MetaError> {
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) => {
                    if attempts > self.config.max_retries {
                        error!(path = %path.display(), attempts, "Giving up on locked path: {}", e);
                        return Err(MetaError::TransientLock {
                            path: path.to_path_buf(),
                            attempts,
                            source: e,
                        });
                    }
                    info!(path = %path.display(), attempt = attempts, "Path locked, retrying");
                    thread::sleep(delay);
                }
                Err(e) => return Err(MetaError::IoError(e)),
            }
        }
    }
}

fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
