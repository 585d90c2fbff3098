//! Metrics for the checking pipeline
//!
//! Privacy-safe: only source/outcome labels, never hashes or prefixes.
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{counter, histogram};
use std::time::Duration;

pub const SOURCE_CACHE: &str = "cache";
pub const SOURCE_NETWORK: &str = "network";

pub const OUTCOME_FOUND: &str = "found";
pub const OUTCOME_NOT_FOUND: &str = "not_found";
pub const OUTCOME_FAILED: &str = "failed";
pub const OUTCOME_DUPLICATE: &str = "duplicate";

pub fn record_range_request(cache_status: Option<&str>, duration: Duration) {
    let status = cache_status.unwrap_or("none").to_ascii_uppercase();
    counter!("pwned_range_requests_total", "cache_status" => status).increment(1);
    histogram!("pwned_range_request_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_lookup(source: &'static str) {
    counter!("pwned_lookups_total", "source" => source).increment(1);
}

pub fn record_item(outcome: &'static str) {
    counter!("pwned_items_total", "outcome" => outcome).increment(1);
}

pub fn record_resolution_failure() {
    counter!("pwned_resolution_failures_total").increment(1);
}
