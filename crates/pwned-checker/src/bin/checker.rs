//! Checker CLI binary
//!
//! Run with:
//! ```bash
//! cargo run -p pwned-checker --bin pwned-checker -- --input input.txt --output output.txt
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pwned_checker::{write_output, Pipeline};
use pwned_core::{CacheMode, CheckerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pwned-checker")]
#[command(about = "Check a credential list against the Pwned Passwords range API")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Newline-delimited credential list
    #[arg(long)]
    input: Option<PathBuf>,

    /// Results file (`plaintext,prevalence` per line)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding one cached range per prefix
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Range API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// User-Agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Number of workers (and queue capacity)
    #[arg(long, short = 'p')]
    parallelism: Option<usize>,

    /// Cap on concurrently running hash tasks (unbounded if unset)
    #[arg(long)]
    hash_concurrency: Option<usize>,

    /// Per-request deadline in seconds, 0 to disable
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Ignore cached ranges but still rewrite them
    #[arg(long, conflicts_with = "no_cache")]
    skip_cache: bool,

    /// Wipe the cache directory before the run
    #[arg(long)]
    clear_cache: bool,

    /// Neither read nor write the cache
    #[arg(long)]
    no_cache: bool,

    /// Write credentials absent from their range with prevalence 0
    #[arg(long)]
    include_not_found: bool,

    /// Disable the progress spinner
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<CheckerConfig> {
        let mut config = match &self.config {
            Some(path) => CheckerConfig::load(path)?,
            None => CheckerConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(dir) = self.cache_dir {
            config.cache_dir = dir;
        }
        if let Some(url) = self.api_url {
            config.api_url = url;
        }
        if let Some(agent) = self.user_agent {
            config.user_agent = agent;
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if self.hash_concurrency.is_some() {
            config.hash_concurrency = self.hash_concurrency;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        if self.no_cache {
            config.cache_mode = CacheMode::Disabled;
        } else if self.skip_cache {
            config.cache_mode = CacheMode::Refresh;
        }
        config.clear_cache |= self.clear_cache;
        config.include_not_found |= self.include_not_found;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pwned_checker=info".parse()?))
        .init();

    let args = Args::parse();
    let quiet = args.quiet;
    let config = args.into_config()?;
    let output_path = config.output_path.clone();

    let pipeline = Pipeline::new(config)?;
    let ctx = pipeline.context();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::default_spinner().template("[{elapsed_precise}] {spinner} {msg}")?);

    let ticker = {
        let pb = pb.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(200));
            loop {
                interval.tick().await;
                pb.set_message(format!(
                    "{} processed, {} pending, {} API calls",
                    ctx.counters.processed(),
                    ctx.completion.pending(),
                    ctx.stats.api_request_count()
                ));
                pb.tick();
            }
        })
    };

    let result = pipeline.run().await;
    ticker.abort();
    pb.finish_and_clear();
    let outcome = result?;

    write_output(&output_path, &outcome.records)?;
    println!("{}", outcome.report());

    Ok(())
}
