//! Local range cache
//!
//! One JSON file per 5-char prefix, e.g. `cache/5BAA6`. Files are
//! independent; concurrent writers of the same prefix write identical
//! content, and each write lands through a rename so readers never see a
//! partial file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use pwned_core::RangeEntry;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{CheckerError, Result};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Prefix-keyed store of parsed range responses
#[derive(Debug, Clone)]
pub struct RangeCache {
    dir: PathBuf,
}

impl RangeCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, prefix: &str) -> PathBuf {
        self.dir.join(prefix)
    }

    /// Create the cache directory, wiping it first when `clear` is set
    pub async fn prepare(&self, clear: bool) -> Result<()> {
        let dir_err = |source: std::io::Error| CheckerError::CacheDir {
            path: self.dir.clone(),
            source,
        };

        if clear {
            match fs::remove_dir_all(&self.dir).await {
                Ok(()) => tracing::info!(dir = %self.dir.display(), "Cleared range cache"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(dir_err(e)),
            }
        }

        fs::create_dir_all(&self.dir).await.map_err(dir_err)
    }

    /// Whether a cache file exists for the prefix
    pub async fn exists(&self, prefix: &str) -> bool {
        fs::metadata(self.path(prefix))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Load the cached range for a prefix
    ///
    /// An unreadable or malformed file yields an empty list; callers treat
    /// that as "no match" rather than as an error.
    pub async fn load(&self, prefix: &str) -> Vec<RangeEntry> {
        let path = self.path(prefix);
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                debug!(prefix, error = %e, "Cache file unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(prefix, error = %e, "Corrupt cache file, ignoring");
                Vec::new()
            }
        }
    }

    /// Persist a parsed range; failures are logged and swallowed
    pub async fn store(&self, prefix: &str, entries: &[RangeEntry]) {
        if let Err(e) = self.try_store(prefix, entries).await {
            warn!(prefix, error = %e, "Failed to write cache file");
        }
    }

    async fn try_store(&self, prefix: &str, entries: &[RangeEntry]) -> std::io::Result<()> {
        let data = serde_json::to_vec(entries)?;
        let tmp = self.dir.join(format!(
            ".{}.{}.{}.tmp",
            prefix,
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = fs::write(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, self.path(prefix)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }

        debug!(prefix, entries = entries.len(), "Cached range");
        Ok(())
    }
}
