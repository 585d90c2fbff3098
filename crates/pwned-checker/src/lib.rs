//! Concurrent checker for large credential lists
//!
//! This crate provides the checking pipeline that:
//! 1. Reads credentials line by line and hashes each one
//! 2. Feeds them through a bounded queue to a fixed pool of workers
//! 3. Resolves each hash from the local range cache or the range API
//! 4. Merges prevalence counts into a shared password registry
//!
//! ## Usage
//!
//! ```no_run
//! use pwned_checker::Pipeline;
//! use pwned_core::CheckerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CheckerConfig::default();
//!     let pipeline = Pipeline::new(config)?;
//!     let outcome = pipeline.run().await?;
//!     println!("{}", outcome.report());
//!     Ok(())
//! }
//! ```

mod cache;
mod completion;
mod error;
pub mod metrics;
mod output;
mod pipeline;
mod registry;
mod resolve;

pub use cache::RangeCache;
pub use completion::CompletionCounter;
pub use error::{CheckerError, Result};
pub use output::{write_output, RunReport};
pub use pipeline::{Pipeline, PipelineContext, RunCounters, RunCounts, RunOutcome, WorkItem};
pub use registry::PasswordRegistry;
pub use resolve::{Resolution, Resolver};
