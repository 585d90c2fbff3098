//! End-to-end checker tests
//!
//! Runs the full pipeline against a local mock of the range API:
//! input file -> hashing -> workers -> cache/network -> registry -> output file

use std::collections::HashSet;
use std::path::{Path as FsPath, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use pwned_checker::{write_output, CheckerError, Pipeline, RangeCache, RunOutcome};
use pwned_core::{hash_password, CacheMode, CheckerConfig, RangeEntry};
use tempfile::TempDir;
use tokio::net::TcpListener;

// SHA-1("password") = 5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8
const PASSWORD_RANGE: &str = "003D68EB55068C33ACE09247EE4C639306B:3\r\n\
                              1E4C9B93F3F0682250B6CF8331B7EE68FD8:3303003\r\n\
                              1F2B668E8AABEF1C59E9EC6F82E3F3CD786:1";

// SHA-1("123456") = 7C4A8D09CA3762AF61E59520943DC26494F8941B
const NUMERIC_RANGE: &str = "D09CA3762AF61E59520943DC26494F8941B:37359195\r\n\
                             D0A1B2C3D4E5F60718293A4B5C6D7E8F901:2";

// SHA-1("hello") = AAF4C61DDCC5E8A2DABEDE0F3B482CD9AEA9434D
const MALFORMED_RANGE: &str = "61DDCC5E8A2DABEDE0F3B482CD9AEA9434D:lots";

#[derive(Default)]
struct MockState {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
}

async fn range(State(state): State<Arc<MockState>>, Path(prefix): Path<String>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let hang = state.hanging.lock().unwrap().contains(&prefix);
    if hang {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    if state.failing.lock().unwrap().contains(&prefix) {
        return (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response();
    }

    let (body, cache_status) = match prefix.as_str() {
        "5BAA6" => (PASSWORD_RANGE.to_string(), "HIT"),
        "7C4A8" => (NUMERIC_RANGE.to_string(), "MISS"),
        "AAF4C" => (MALFORMED_RANGE.to_string(), "MISS"),
        _ => (format!("{}:1", "0".repeat(35)), "DYNAMIC"),
    };
    if cache_status == "HIT" {
        state.cache_hits.fetch_add(1, Ordering::SeqCst);
    }

    let mut headers = HeaderMap::new();
    headers.insert("CF-Cache-Status", HeaderValue::from_static(cache_status));
    (StatusCode::OK, headers, body).into_response()
}

/// Mock range API plus a scratch directory for input, output and cache
struct TestHarness {
    api_url: String,
    state: Arc<MockState>,
    dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/range/:prefix", get(range))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            api_url: format!("http://{}", addr),
            state,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn requests(&self) -> u64 {
        self.state.requests.load(Ordering::SeqCst)
    }

    fn fail_prefix(&self, prefix: &str) {
        self.state.failing.lock().unwrap().insert(prefix.to_string());
    }

    fn hang_prefix(&self, prefix: &str) {
        self.state.hanging.lock().unwrap().insert(prefix.to_string());
    }

    fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    fn cache(&self) -> RangeCache {
        RangeCache::new(self.cache_dir())
    }

    fn output_path(&self) -> PathBuf {
        self.dir.path().join("output.txt")
    }

    fn config(&self, input: &str, parallelism: usize) -> CheckerConfig {
        let input_path = self.dir.path().join("input.txt");
        std::fs::write(&input_path, input).unwrap();

        let mut config = CheckerConfig::default()
            .with_api_url(&self.api_url)
            .with_cache_dir(self.cache_dir())
            .with_parallelism(parallelism);
        config.input_path = input_path;
        config.output_path = self.output_path();
        config
    }

    async fn run(&self, config: CheckerConfig) -> RunOutcome {
        let output_path = config.output_path.clone();
        let outcome = Pipeline::new(config).unwrap().run().await.unwrap();
        write_output(&output_path, &outcome.records).unwrap();
        outcome
    }

    fn output_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = std::fs::read_to_string(self.output_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        lines.sort();
        lines
    }
}

fn cache_file_json(cache_dir: &FsPath, prefix: &str) -> serde_json::Value {
    let raw = std::fs::read(cache_dir.join(prefix)).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_with_duplicates() {
    let harness = TestHarness::new().await;
    let input = "password\npassword\n123456\npassword\nzebra-crossing-unlisted\n";

    let outcome = harness.run(harness.config(input, 4)).await;

    assert_eq!(outcome.counts.processed, 5);
    assert_eq!(outcome.counts.not_found, 1);
    assert_eq!(outcome.counts.failed, 0);
    assert_eq!(outcome.counts.resolved + outcome.counts.duplicates, 4);
    assert_eq!(
        harness.output_lines(),
        vec!["123456,37359195", "password,3303003"]
    );

    // Duplicates racing past the registry may each fetch the same range
    let requests = harness.requests();
    assert!((3..=5).contains(&requests), "requests = {}", requests);
    assert_eq!(outcome.stats.api_request_count, requests);
    assert_eq!(outcome.stats.response_times_ms.len() as u64, requests);
    assert_eq!(
        outcome.stats.provider_cached_count,
        harness.state.cache_hits.load(Ordering::SeqCst)
    );
    assert!(outcome.average_latency.ends_with("ms"));
}

#[tokio::test]
async fn test_duplicates_with_single_worker_fetch_once() {
    let harness = TestHarness::new().await;

    let outcome = harness
        .run(harness.config("password\npassword\npassword\n", 1))
        .await;

    assert_eq!(harness.requests(), 1);
    assert_eq!(outcome.counts.resolved, 1);
    assert_eq!(outcome.counts.duplicates, 2);
    assert_eq!(outcome.stats.provider_cached_count, 1);
    assert_eq!(harness.output_lines(), vec!["password,3303003"]);
}

#[tokio::test]
async fn test_cache_file_format() {
    let harness = TestHarness::new().await;
    harness.run(harness.config("password\n", 1)).await;

    let json = cache_file_json(&harness.cache_dir(), "5BAA6");
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["suffix"], "1E4C9B93F3F0682250B6CF8331B7EE68FD8");
    assert_eq!(entries[1]["count"], 3303003);
}

#[tokio::test]
async fn test_second_run_served_from_cache() {
    let harness = TestHarness::new().await;
    let input = "password\n123456\n";

    let first = harness.run(harness.config(input, 2)).await;
    assert_eq!(harness.requests(), 2);
    assert_eq!(first.stats.api_request_count, 2);

    let second = harness.run(harness.config(input, 2)).await;
    assert_eq!(harness.requests(), 2);
    assert_eq!(second.stats.api_request_count, 0);
    assert_eq!(second.average_latency, "not recorded");
    assert_eq!(second.report().to_string().lines().count(), 6);
    assert!(second
        .report()
        .to_string()
        .contains("Provider Cached Calls: no requests made"));
    assert_eq!(
        harness.output_lines(),
        vec!["123456,37359195", "password,3303003"]
    );
}

#[tokio::test]
async fn test_skip_cache_refreshes_stale_entry() {
    let harness = TestHarness::new().await;
    harness.cache().prepare(false).await.unwrap();
    harness
        .cache()
        .store(
            "5BAA6",
            &[RangeEntry::new("1E4C9B93F3F0682250B6CF8331B7EE68FD8", 1)],
        )
        .await;

    let stale = harness.run(harness.config("password\n", 1)).await;
    assert_eq!(harness.requests(), 0);
    assert_eq!(stale.records[0].prevalence, 1);

    let refreshed = harness
        .run(harness.config("password\n", 1).with_cache_mode(CacheMode::Refresh))
        .await;
    assert_eq!(harness.requests(), 1);
    assert_eq!(refreshed.records[0].prevalence, 3303003);

    let cached = harness.cache().load("5BAA6").await;
    assert_eq!(cached.len(), 3);
    assert!(cached.contains(&RangeEntry::new("1E4C9B93F3F0682250B6CF8331B7EE68FD8", 3303003)));
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let harness = TestHarness::new().await;
    harness.run(harness.config("password\n", 1)).await;
    assert_eq!(harness.requests(), 1);

    let mut config = harness.config("password\n", 1);
    config.clear_cache = true;
    harness.run(config).await;
    assert_eq!(harness.requests(), 2);
}

#[tokio::test]
async fn test_disabled_cache_writes_nothing() {
    let harness = TestHarness::new().await;

    let outcome = harness
        .run(harness.config("password\n", 1).with_cache_mode(CacheMode::Disabled))
        .await;

    assert_eq!(outcome.records.len(), 1);
    assert!(!harness.cache().exists("5BAA6").await);
}

#[tokio::test]
async fn test_malformed_range_fails_item_and_is_not_cached() {
    let harness = TestHarness::new().await;

    let outcome = harness.run(harness.config("hello\npassword\n", 2)).await;

    assert_eq!(outcome.counts.failed, 1);
    assert_eq!(outcome.counts.resolved, 1);
    assert!(!harness.cache().exists("AAF4C").await);
    assert!(harness.cache().exists("5BAA6").await);
    assert_eq!(harness.output_lines(), vec!["password,3303003"]);
}

#[tokio::test]
async fn test_error_status_is_counted_and_dropped() {
    let harness = TestHarness::new().await;
    let hash = hash_password("letmein");
    harness.fail_prefix(&hash[..5]);

    let outcome = harness.run(harness.config("letmein\npassword\n", 2)).await;

    assert_eq!(outcome.counts.failed, 1);
    assert_eq!(outcome.stats.api_request_count, 2);
    assert!(!harness.cache().exists(&hash[..5]).await);
    assert_eq!(harness.output_lines(), vec!["password,3303003"]);
}

#[tokio::test]
async fn test_hung_prefix_times_out_and_run_completes() {
    let harness = TestHarness::new().await;
    let hash = hash_password("letmein");
    harness.hang_prefix(&hash[..5]);

    let mut config = harness.config("letmein\npassword\n", 2);
    config.request_timeout_secs = Some(1);

    let outcome = tokio::time::timeout(Duration::from_secs(15), harness.run(config))
        .await
        .expect("run should finish once the deadline expires");

    assert_eq!(outcome.counts.processed, 2);
    assert_eq!(outcome.counts.failed, 1);
    assert_eq!(outcome.counts.resolved, 1);
    assert_eq!(harness.requests(), 2);
    // Only the answered request reaches the statistics
    assert_eq!(outcome.stats.api_request_count, 1);
    assert!(!harness.cache().exists(&hash[..5]).await);
    assert_eq!(harness.output_lines(), vec!["password,3303003"]);
}

#[tokio::test]
async fn test_include_not_found_writes_zero_prevalence() {
    let harness = TestHarness::new().await;

    harness
        .run(
            harness
                .config("zebra-crossing-unlisted\npassword\n", 2)
                .with_include_not_found(true),
        )
        .await;

    assert_eq!(
        harness.output_lines(),
        vec!["password,3303003", "zebra-crossing-unlisted,0"]
    );
}

#[tokio::test]
async fn test_line_endings_and_blank_lines() {
    let harness = TestHarness::new().await;

    let outcome = harness
        .run(harness.config("password\r\n\r\n123456", 3))
        .await;

    // The blank line is checked as the empty credential
    assert_eq!(outcome.counts.processed, 3);
    assert_eq!(outcome.counts.not_found, 1);
    assert_eq!(
        harness.output_lines(),
        vec!["123456,37359195", "password,3303003"]
    );
}

#[tokio::test]
async fn test_unreachable_api_drops_everything() {
    let harness = TestHarness::new().await;
    let mut config = harness.config("password\n123456\n", 2);
    config.api_url = "http://127.0.0.1:9".into();
    config.request_timeout_secs = Some(5);

    let outcome = harness.run(config).await;

    assert_eq!(outcome.counts.failed, 2);
    assert_eq!(outcome.stats.api_request_count, 0);
    assert!(harness.output_lines().is_empty());
}

#[tokio::test]
async fn test_missing_input_is_fatal() {
    let harness = TestHarness::new().await;
    let mut config = harness.config("", 1);
    config.input_path = harness.dir.path().join("nope.txt");

    let err = Pipeline::new(config).unwrap().run().await.unwrap_err();
    assert!(matches!(err, CheckerError::Input { .. }));
    assert_eq!(harness.requests(), 0);
}
