//! Checker configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_API_URL, DEFAULT_PARALLELISM};
use crate::Error;

/// How the local range cache participates in resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Read cached ranges, write ranges fetched on a miss
    #[default]
    ReadWrite,
    /// Ignore cached ranges but rewrite them from fresh responses
    Refresh,
    /// Neither read nor write the cache
    Disabled,
}

impl CacheMode {
    pub fn reads(self) -> bool {
        matches!(self, CacheMode::ReadWrite)
    }

    pub fn writes(self) -> bool {
        !matches!(self, CacheMode::Disabled)
    }
}

/// Configuration for a checking run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Newline-delimited credential list
    pub input_path: PathBuf,
    /// `plaintext,prevalence` results file
    pub output_path: PathBuf,
    /// Directory holding one JSON file per range prefix
    pub cache_dir: PathBuf,
    /// Base URL of the range API (without `/range`)
    pub api_url: String,
    /// `User-Agent` sent with every range request
    pub user_agent: String,
    /// Number of concurrent workers and the queue capacity
    pub parallelism: usize,
    /// Cap on lines hashed ahead of the queue (unbounded when `None`)
    pub hash_concurrency: Option<usize>,
    /// Per-request deadline in seconds (no deadline when `None`)
    pub request_timeout_secs: Option<u64>,
    pub cache_mode: CacheMode,
    /// Remove the cache directory before the run
    pub clear_cache: bool,
    /// Record unmatched credentials with prevalence 0 instead of dropping them
    pub include_not_found: bool,
}

fn default_user_agent() -> String {
    format!("pwned-speedcheck/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input.txt"),
            output_path: PathBuf::from("output.txt"),
            cache_dir: PathBuf::from("cache"),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            parallelism: DEFAULT_PARALLELISM,
            hash_concurrency: None,
            request_timeout_secs: Some(30),
            cache_mode: CacheMode::default(),
            clear_cache: false,
            include_not_found: false,
        }
    }
}

impl CheckerConfig {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_hash_concurrency(mut self, limit: Option<usize>) -> Self {
        self.hash_concurrency = limit;
        self
    }

    pub fn with_include_not_found(mut self, include: bool) -> Self {
        self.include_not_found = include;
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be at least 1".into()));
        }
        if self.hash_concurrency == Some(0) {
            return Err(Error::InvalidConfig(
                "hash_concurrency must be at least 1 when set".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(Error::InvalidConfig("api_url is empty".into()));
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
