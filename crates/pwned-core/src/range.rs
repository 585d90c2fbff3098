//! Range API entries and the `SUFFIX:COUNT` body parser

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One suffix returned for a 5-char prefix, with its breach count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub suffix: String,
    pub count: u64,
}

impl RangeEntry {
    pub fn new(suffix: impl Into<String>, count: u64) -> Self {
        Self {
            suffix: suffix.into(),
            count,
        }
    }

    /// Case-insensitive suffix comparison
    pub fn matches(&self, suffix: &str) -> bool {
        self.suffix.eq_ignore_ascii_case(suffix)
    }
}

/// Malformed line in a range response
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing ':' separator in line {line:?}")]
    MissingSeparator { line: String },

    #[error("invalid count in line {line:?}: {source}")]
    InvalidCount {
        line: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Parse a single `SUFFIX:COUNT` line
pub fn parse_range_line(line: &str) -> Result<RangeEntry, ParseError> {
    let (suffix, count) = line
        .split_once(':')
        .ok_or_else(|| ParseError::MissingSeparator {
            line: line.to_string(),
        })?;

    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|source| ParseError::InvalidCount {
            line: line.to_string(),
            source,
        })?;

    Ok(RangeEntry::new(suffix.trim().to_ascii_uppercase(), count))
}

/// Parse a full range response body, skipping blank lines
///
/// Any malformed line fails the whole body so a partial range is never
/// treated as complete.
pub fn parse_range_body<'a, I>(lines: I) -> Result<Vec<RangeEntry>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(parse_range_line)
        .collect()
}
