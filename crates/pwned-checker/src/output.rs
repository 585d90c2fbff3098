//! Results file and run report

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use pwned_core::{provider_cache_summary, CredentialRecord};

use crate::error::{CheckerError, Result};
use crate::pipeline::{RunCounts, RunOutcome};

/// Write one `plaintext,prevalence` line per record
///
/// Returns the number of lines written.
pub fn write_output(path: impl AsRef<Path>, records: &[CredentialRecord]) -> Result<usize> {
    let path = path.as_ref();
    let output_err = |source: std::io::Error| CheckerError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(output_err)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        record.write_output_line(&mut writer).map_err(output_err)?;
    }
    writer.flush().map_err(output_err)?;

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Wrote results"
    );

    Ok(records.len())
}

/// Human-readable summary of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub elapsed: Duration,
    pub counts: RunCounts,
    pub api_requests: u64,
    pub provider_cached: u64,
    pub average_latency: String,
}

impl RunReport {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        Self {
            elapsed: outcome.elapsed,
            counts: outcome.counts,
            api_requests: outcome.stats.api_request_count,
            provider_cached: outcome.stats.provider_cached_count,
            average_latency: outcome.average_latency.clone(),
        }
    }

    /// Items processed per second, over at least one millisecond
    pub fn rate_per_sec(&self) -> u64 {
        let millis = (self.elapsed.as_millis() as u64).max(1);
        self.counts.processed * 1000 / millis
    }

    /// Credentials absent from the output
    pub fn dropped(&self) -> u64 {
        self.counts.failed + self.counts.not_found
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Time Taken: {}ms", self.elapsed.as_millis())?;
        writeln!(
            f,
            "Passwords Processed: {} @ {}/sec",
            self.counts.processed,
            self.rate_per_sec()
        )?;
        writeln!(f, "API Calls: {}", self.api_requests)?;
        writeln!(f, "Average API Response: {}", self.average_latency)?;
        writeln!(
            f,
            "Provider Cached Calls: {}",
            provider_cache_summary(self.api_requests, self.provider_cached)
        )?;
        write!(
            f,
            "Resolved: {}, Duplicates: {}, Not Found: {}, Failed: {}",
            self.counts.resolved, self.counts.duplicates, self.counts.not_found, self.counts.failed
        )
    }
}
