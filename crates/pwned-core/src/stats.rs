//! Range API statistics
//!
//! Latency samples and provider cache counters are kept under a single
//! lock, separate from the password registry.

use std::sync::{Mutex, MutexGuard};

/// `CF-Cache-Status` values meaning the edge answered from its own cache
pub const PROVIDER_CACHED_STATUSES: [&str; 3] = ["HIT", "STALE", "REVALIDATED"];

#[derive(Debug, Default)]
struct StatsInner {
    response_times_ms: Vec<u64>,
    api_request_count: u64,
    provider_cached_count: u64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub response_times_ms: Vec<u64>,
    pub api_request_count: u64,
    pub provider_cached_count: u64,
}

/// Accumulates per-request latency and provider cache hits
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    inner: Mutex<StatsInner>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        // Counters stay consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one completed range request
    pub fn record(&self, latency_ms: u64, cache_status: Option<&str>) {
        let mut inner = self.lock();
        inner.response_times_ms.push(latency_ms);
        inner.api_request_count += 1;

        if let Some(status) = cache_status {
            let status = status.trim();
            if PROVIDER_CACHED_STATUSES
                .iter()
                .any(|cached| cached.eq_ignore_ascii_case(status))
            {
                inner.provider_cached_count += 1;
            }
        }
    }

    pub fn api_request_count(&self) -> u64 {
        self.lock().api_request_count
    }

    pub fn provider_cached_count(&self) -> u64 {
        self.lock().provider_cached_count
    }

    /// Mean latency rounded to the nearest millisecond, e.g. `"42ms"`
    pub fn average_latency(&self) -> String {
        let inner = self.lock();
        let samples = inner.response_times_ms.len() as u64;
        if samples == 0 {
            return "not recorded".to_string();
        }
        let total: u64 = inner.response_times_ms.iter().sum();
        format!("{}ms", (total + samples / 2) / samples)
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let inner = self.lock();
        StatisticsSnapshot {
            response_times_ms: inner.response_times_ms.clone(),
            api_request_count: inner.api_request_count,
            provider_cached_count: inner.provider_cached_count,
        }
    }
}

/// Describe how many range requests the provider served from its cache
pub fn provider_cache_summary(request_count: u64, cached_count: u64) -> String {
    if request_count == 0 {
        return "no requests made".to_string();
    }
    if cached_count == 0 {
        return "no cached responses".to_string();
    }
    let percent = cached_count as f64 / request_count as f64 * 100.0;
    format!("{} ({:.0}%)", cached_count, percent)
}
