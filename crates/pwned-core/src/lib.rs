//! pwned-core: Core types for the Pwned Passwords speed checker
//!
//! This crate defines the pieces shared by the lookup client and the
//! checking pipeline:
//! - SHA-1 hashing of credentials and the prefix/suffix split used by
//!   the k-anonymity range API
//! - Range entries (`SUFFIX:COUNT` lines) and their parser
//! - Credential records stored in the password registry
//! - Run statistics (latency and provider cache hits)
//! - Checker configuration
//!
//! # Privacy Model
//!
//! The range API never sees a full hash. Only the first five hex
//! characters leave the machine; the remaining 35 are matched locally.
//!
//! | Information | Provider Knowledge |
//! |-------------|--------------------|
//! | 5-char hash prefix | **YES** - part of the URL |
//! | Full hash / plaintext | NO - matched client-side |
//! | Which suffix matched | NO - whole range is returned |
//! | Query timing, client identity | YES - via network metadata |

mod config;
mod error;
mod hash;
mod range;
mod record;
mod stats;

pub use config::{CacheMode, CheckerConfig};
pub use error::Error;
pub use hash::{hash_password, is_valid_prefix, split_hash};
pub use range::{parse_range_body, parse_range_line, ParseError, RangeEntry};
pub use record::CredentialRecord;
pub use stats::{provider_cache_summary, StatisticsSnapshot, StatisticsTracker, PROVIDER_CACHED_STATUSES};

pub type Result<T> = std::result::Result<T, Error>;

/// Constants for the range API
pub mod constants {
    /// Length of a full SHA-1 hex digest
    pub const HASH_LEN: usize = 40;

    /// Length of the prefix sent to the range API
    pub const PREFIX_LEN: usize = 5;

    /// Length of the suffix matched locally
    pub const SUFFIX_LEN: usize = HASH_LEN - PREFIX_LEN;

    /// Public Pwned Passwords endpoint
    pub const DEFAULT_API_URL: &str = "https://api.pwnedpasswords.com";

    /// Response header carrying the edge cache status
    pub const CACHE_STATUS_HEADER: &str = "CF-Cache-Status";

    /// Default number of concurrent workers
    pub const DEFAULT_PARALLELISM: usize = 500;
}
