//! pwned-speedcheck: check large credential lists against Pwned Passwords
//!
//! Re-exports the workspace crates:
//! - [`pwned_core`]: hashing, range parsing, records, statistics and configuration
//! - [`pwned_client`]: the k-anonymity range client
//! - [`pwned_checker`]: the cache, worker pipeline and run report

pub use pwned_checker;
pub use pwned_client;
pub use pwned_core;

pub use pwned_checker::{write_output, Pipeline, RunOutcome, RunReport};
pub use pwned_client::{ClientBuilder, RangeClient};
pub use pwned_core::{hash_password, CacheMode, CheckerConfig, CredentialRecord};
