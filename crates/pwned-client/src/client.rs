//! Range API client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;

use pwned_core::constants::{CACHE_STATUS_HEADER, DEFAULT_API_URL};
use pwned_core::{is_valid_prefix, parse_range_body, CheckerConfig, RangeEntry, StatisticsTracker};

use crate::error::{ClientError, Result};

/// Raw response for one range prefix
#[derive(Debug, Clone)]
pub struct RangeResponse {
    pub prefix: String,
    /// Body split into lines, unparsed
    pub lines: Vec<String>,
    /// `CF-Cache-Status` header, if the provider sent one
    pub cache_status: Option<String>,
    /// Time from sending the request to the end of the body
    pub latency: Duration,
}

impl RangeResponse {
    /// Parse every `SUFFIX:COUNT` line
    pub fn entries(&self) -> Result<Vec<RangeEntry>> {
        Ok(parse_range_body(self.lines.iter().map(String::as_str))?)
    }
}

/// Client for `GET {api_url}/range/{prefix}`
///
/// One request per call, no retries. Every response that arrives,
/// successful or not, is recorded in the shared statistics.
#[derive(Clone)]
pub struct RangeClient {
    http: Client,
    api_url: String,
    stats: Arc<StatisticsTracker>,
}

impl RangeClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn statistics(&self) -> &Arc<StatisticsTracker> {
        &self.stats
    }

    /// Fetch the raw range for a 5-char uppercase hex prefix
    pub async fn query(&self, prefix: &str) -> Result<RangeResponse> {
        if !is_valid_prefix(prefix) {
            return Err(ClientError::InvalidPrefix(prefix.to_string()));
        }

        let url = format!("{}/range/{}", self.api_url, prefix);
        let start = Instant::now();

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let cache_status = resp
            .headers()
            .get(CACHE_STATUS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;
        let latency = start.elapsed();

        self.stats
            .record(latency.as_millis() as u64, cache_status.as_deref());

        tracing::debug!(
            prefix,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            cache_status = cache_status.as_deref().unwrap_or("-"),
            "Range request complete"
        );

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
                cache_status,
                latency,
            });
        }

        Ok(RangeResponse {
            prefix: prefix.to_string(),
            lines: body.lines().map(str::to_string).collect(),
            cache_status,
            latency,
        })
    }

    /// Fetch and parse a range in one step
    pub async fn fetch_range(&self, prefix: &str) -> Result<Vec<RangeEntry>> {
        self.query(prefix).await?.entries()
    }
}

/// Builder for RangeClient
pub struct ClientBuilder {
    api_url: String,
    user_agent: String,
    timeout: Option<Duration>,
    stats: Option<Arc<StatisticsTracker>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("pwned-speedcheck/{}", env!("CARGO_PKG_VERSION")),
            timeout: Some(Duration::from_secs(30)),
            stats: None,
        }
    }

    /// Take endpoint, user agent and deadline from a checker config
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new()
            .api_url(config.api_url.clone())
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Per-request deadline; `None` waits indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn statistics(mut self, stats: Arc<StatisticsTracker>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> Result<RangeClient> {
        let mut http = Client::builder()
            .user_agent(self.user_agent)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(200);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(RangeClient {
            http: http.build().map_err(ClientError::Transport)?,
            api_url: self.api_url,
            stats: self.stats.unwrap_or_default(),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
