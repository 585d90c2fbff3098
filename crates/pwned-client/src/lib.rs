//! pwned-client: k-anonymity range client for Pwned Passwords
//!
//! Sends only the 5-char SHA-1 prefix to the range API and returns every
//! `SUFFIX:COUNT` pair for it, recording latency and edge cache status
//! into a shared [`StatisticsTracker`](pwned_core::StatisticsTracker).

pub mod client;
pub mod error;

pub use client::{ClientBuilder, RangeClient, RangeResponse};
pub use error::{ClientError, Result};
