use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use pwned_client::ClientBuilder;
use pwned_core::{CheckerConfig, CredentialRecord, StatisticsSnapshot, StatisticsTracker};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::cache::RangeCache;
use crate::completion::CompletionCounter;
use crate::error::{CheckerError, Result};
use crate::metrics;
use crate::output::RunReport;
use crate::registry::PasswordRegistry;
use crate::resolve::{Resolution, Resolver};

/// A hashed credential waiting for a worker
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub record: CredentialRecord,
}

/// Per-run item counters
#[derive(Debug, Default)]
pub struct RunCounters {
    processed: AtomicU64,
    resolved: AtomicU64,
    duplicates: AtomicU64,
    not_found: AtomicU64,
    failed: AtomicU64,
}

impl RunCounters {
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RunCounts {
        RunCounts {
            processed: self.processed.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Final item counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Items consumed by workers
    pub processed: u64,
    /// Matched in their range and written to the registry
    pub resolved: u64,
    /// Already in the registry when a worker picked them up
    pub duplicates: u64,
    /// Range fetched but suffix absent
    pub not_found: u64,
    /// Dropped after a network or parse failure
    pub failed: u64,
}

/// State shared by the dispatcher and every worker
pub struct PipelineContext {
    pub registry: PasswordRegistry,
    pub stats: Arc<StatisticsTracker>,
    pub completion: CompletionCounter,
    pub counters: RunCounters,
    resolver: Resolver,
    include_not_found: bool,
    hash_limit: Option<Arc<Semaphore>>,
    queue: Mutex<mpsc::Receiver<WorkItem>>,
}

impl PipelineContext {
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    async fn next_item(&self) -> Option<WorkItem> {
        self.queue.lock().await.recv().await
    }

    /// Check the registry, resolve on a miss, merge the result
    async fn process(&self, item: WorkItem) {
        let record = item.record;

        // Lock is released before resolving; a concurrent worker may resolve
        // the same hash too, and both inserts carry the same value.
        if self.registry.contains(&record.full_hash) {
            self.counters.duplicates.fetch_add(1, Ordering::Relaxed);
            metrics::record_item(metrics::OUTCOME_DUPLICATE);
            return;
        }

        match self.resolver.resolve(&record.full_hash).await {
            Ok(Resolution::Found(count)) => {
                self.registry.insert(record.with_prevalence(count));
                self.counters.resolved.fetch_add(1, Ordering::Relaxed);
                metrics::record_item(metrics::OUTCOME_FOUND);
            }
            Ok(Resolution::NotFound) => {
                self.counters.not_found.fetch_add(1, Ordering::Relaxed);
                metrics::record_item(metrics::OUTCOME_NOT_FOUND);
                if self.include_not_found {
                    self.registry.insert(record);
                } else {
                    debug!(prefix = record.prefix(), "Suffix not in range, dropping");
                }
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                metrics::record_item(metrics::OUTCOME_FAILED);
                metrics::record_resolution_failure();
                warn!(prefix = record.prefix(), error = %e, "Failed to resolve credential, dropping");
            }
        }
    }
}

/// Marks one item done even if processing unwinds
struct DoneGuard<'a>(&'a CompletionCounter);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

async fn run_worker(id: usize, ctx: Arc<PipelineContext>) {
    while let Some(item) = ctx.next_item().await {
        let _done = DoneGuard(&ctx.completion);
        ctx.counters.processed.fetch_add(1, Ordering::Relaxed);
        ctx.process(item).await;
    }
    tracing::trace!(worker = id, "Queue closed, worker exiting");
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub elapsed: Duration,
    pub counts: RunCounts,
    pub stats: StatisticsSnapshot,
    pub average_latency: String,
    /// Registry contents, in no particular order
    pub records: Vec<CredentialRecord>,
}

impl RunOutcome {
    pub fn report(&self) -> RunReport {
        RunReport::from_outcome(self)
    }
}

/// Ingestion, dispatch and the worker pool
///
/// Each input line is hashed in its own task and pushed onto a queue of
/// capacity `parallelism`; exactly `parallelism` workers drain it.
pub struct Pipeline {
    config: CheckerConfig,
    ctx: Arc<PipelineContext>,
    tx: mpsc::Sender<WorkItem>,
}

impl Pipeline {
    pub fn new(config: CheckerConfig) -> Result<Self> {
        config.validate()?;

        let stats = Arc::new(StatisticsTracker::new());
        let client = ClientBuilder::from_config(&config)
            .statistics(stats.clone())
            .build()?;
        let resolver = Resolver::new(RangeCache::new(&config.cache_dir), client, config.cache_mode);

        let (tx, rx) = mpsc::channel(config.parallelism);
        let ctx = Arc::new(PipelineContext {
            registry: PasswordRegistry::new(),
            stats,
            completion: CompletionCounter::new(),
            counters: RunCounters::default(),
            resolver,
            include_not_found: config.include_not_found,
            hash_limit: config.hash_concurrency.map(|n| Arc::new(Semaphore::new(n))),
            queue: Mutex::new(rx),
        });

        Ok(Self { config, ctx, tx })
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Shared state, for progress reporting while `run` is in flight
    pub fn context(&self) -> Arc<PipelineContext> {
        Arc::clone(&self.ctx)
    }

    /// Create (and optionally clear) the cache directory
    pub async fn prepare_cache(&self) -> Result<()> {
        if self.config.clear_cache || self.config.cache_mode.writes() {
            self.ctx.resolver.cache().prepare(self.config.clear_cache).await?;
        }
        Ok(())
    }

    /// Prepare the cache, then check every line of the configured input
    pub async fn run(self) -> Result<RunOutcome> {
        let input = open_input(&self.config.input_path).await?;
        self.prepare_cache().await?;
        self.run_reader(input).await
    }

    /// Check every line from `reader`; the cache must already be prepared
    pub async fn run_reader<R>(self, mut reader: R) -> Result<RunOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        let Pipeline { config, ctx, tx } = self;
        let started = Instant::now();

        info!(
            parallelism = config.parallelism,
            cache_mode = ?config.cache_mode,
            api = %ctx.resolver.client().api_url(),
            "Starting checker pipeline"
        );

        let workers: Vec<_> = (0..config.parallelism)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&ctx))))
            .collect();

        let mut dispatched = 0u64;
        let mut read_error = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }

            let line = trim_line_ending(&buf).to_vec();

            // Bounded hashing waits here; unbounded hashing never blocks the reader.
            let permit = match &ctx.hash_limit {
                Some(limit) => match Arc::clone(limit).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => None,
                },
                None => None,
            };

            ctx.completion.add(1);
            dispatched += 1;

            let tx = tx.clone();
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                let record = CredentialRecord::from_plaintext(line);
                if tx.send(WorkItem { record }).await.is_err() {
                    ctx.completion.done();
                }
                drop(permit);
            });
        }

        debug!(dispatched, "Input exhausted, waiting for workers");
        ctx.completion.wait().await;

        // All items consumed: closing the queue lets idle workers exit.
        drop(tx);
        for joined in join_all(workers).await {
            joined?;
        }

        if let Some(source) = read_error {
            return Err(CheckerError::Input {
                path: config.input_path.clone(),
                source,
            });
        }

        let outcome = RunOutcome {
            elapsed: started.elapsed(),
            counts: ctx.counters.snapshot(),
            stats: ctx.stats.snapshot(),
            average_latency: ctx.stats.average_latency(),
            records: ctx.registry.records(),
        };

        info!(
            processed = outcome.counts.processed,
            resolved = outcome.counts.resolved,
            not_found = outcome.counts.not_found,
            failed = outcome.counts.failed,
            api_requests = outcome.stats.api_request_count,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Pipeline complete"
        );

        Ok(outcome)
    }
}

async fn open_input(path: &Path) -> Result<BufReader<tokio::fs::File>> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| CheckerError::Input {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BufReader::new(file))
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
