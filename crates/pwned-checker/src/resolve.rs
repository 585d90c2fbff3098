//! Cache-or-network resolution of a single hash

use std::time::Duration;

use pwned_client::{ClientError, RangeClient};
use pwned_core::{split_hash, CacheMode, RangeEntry};

use crate::cache::RangeCache;
use crate::error::Result;
use crate::metrics;

/// Result of looking a hash up in its range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Suffix present with this breach count
    Found(u64),
    /// Suffix absent from the range
    NotFound,
}

impl Resolution {
    pub fn prevalence(self) -> Option<u64> {
        match self {
            Resolution::Found(count) => Some(count),
            Resolution::NotFound => None,
        }
    }
}

/// Resolves hashes from the local cache, falling back to the range API
#[derive(Clone)]
pub struct Resolver {
    cache: RangeCache,
    client: RangeClient,
    mode: CacheMode,
}

impl Resolver {
    pub fn new(cache: RangeCache, client: RangeClient, mode: CacheMode) -> Self {
        Self { cache, client, mode }
    }

    pub fn cache(&self) -> &RangeCache {
        &self.cache
    }

    pub fn client(&self) -> &RangeClient {
        &self.client
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Look up the prevalence of a full 40-char hash
    pub async fn resolve(&self, full_hash: &str) -> Result<Resolution> {
        let (prefix, suffix) = split_hash(full_hash)?;
        let entries = self.range(prefix).await?;

        Ok(match entries.iter().find(|e| e.matches(suffix)) {
            Some(entry) => Resolution::Found(entry.count),
            None => Resolution::NotFound,
        })
    }

    /// Entries for a prefix, from cache when allowed, else from the API
    ///
    /// A fresh response is cached only after it parsed completely.
    pub async fn range(&self, prefix: &str) -> Result<Vec<RangeEntry>> {
        if self.mode.reads() && self.cache.exists(prefix).await {
            metrics::record_lookup(metrics::SOURCE_CACHE);
            return Ok(self.cache.load(prefix).await);
        }

        metrics::record_lookup(metrics::SOURCE_NETWORK);
        let response = match self.client.query(prefix).await {
            Ok(response) => response,
            Err(e) => {
                if let Some((cache_status, latency)) = answered_request(&e) {
                    metrics::record_range_request(cache_status, latency);
                }
                return Err(e.into());
            }
        };
        metrics::record_range_request(response.cache_status.as_deref(), response.latency);

        let entries = response.entries()?;
        if self.mode.writes() {
            self.cache.store(prefix, &entries).await;
        }
        Ok(entries)
    }
}

/// Cache status and latency of a request that got a response despite failing
fn answered_request(err: &ClientError) -> Option<(Option<&str>, Duration)> {
    match err {
        ClientError::Status {
            cache_status,
            latency,
            ..
        } => Some((cache_status.as_deref(), *latency)),
        _ => None,
    }
}
