//! pwned-client binary: look up one password or one range prefix

use std::sync::Arc;

use pwned_client::RangeClient;
use pwned_core::{hash_password, split_hash, StatisticsTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut api_url: Option<String> = None;
    let mut prefix_mode = false;
    let mut target: Option<String> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--prefix" => prefix_mode = true,
            "--api-url" => api_url = iter.next().cloned(),
            _ => target = Some(arg.clone()),
        }
    }

    let Some(target) = target else {
        eprintln!("Usage: {} [--api-url URL] [--prefix] <password|prefix>", args[0]);
        eprintln!("Example: {} password", args[0]);
        eprintln!("Example: {} --prefix 5BAA6", args[0]);
        std::process::exit(1);
    };

    let stats = Arc::new(StatisticsTracker::new());
    let mut builder = RangeClient::builder().statistics(stats.clone());
    if let Some(url) = api_url {
        builder = builder.api_url(url);
    }
    let client = builder.build()?;

    if prefix_mode {
        let prefix = target.to_ascii_uppercase();
        let response = client.query(&prefix).await?;
        let entries = response.entries()?;
        let total: u64 = entries.iter().map(|e| e.count).sum();
        println!(
            "{}: {} suffixes, {} total occurrences (cache status: {}, {}ms)",
            prefix,
            entries.len(),
            total,
            response.cache_status.as_deref().unwrap_or("-"),
            response.latency.as_millis()
        );
        return Ok(());
    }

    let hash = hash_password(&target);
    let (prefix, suffix) = split_hash(&hash)?;
    tracing::info!(prefix, "Querying range");

    let entries = client.fetch_range(prefix).await?;
    match entries.iter().find(|e| e.matches(suffix)) {
        Some(entry) => println!("{} has appeared {} times in known breaches", hash, entry.count),
        None => println!("{} was not found in known breaches", hash),
    }
    println!("Average API response: {}", stats.average_latency());

    Ok(())
}
