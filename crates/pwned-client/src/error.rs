//! Client error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(reqwest::Error),

    /// Non-2xx response; carries what was observed so callers can still
    /// account for the request
    #[error("Range API error ({status}): {message}")]
    Status {
        status: u16,
        message: String,
        cache_status: Option<String>,
        latency: Duration,
    },

    #[error("Invalid range prefix: {0}")]
    InvalidPrefix(String),

    #[error("Malformed range response: {0}")]
    Parse(#[from] pwned_core::ParseError),
}

impl ClientError {
    /// Whether the failure happened before a response was parsed
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Timeout(_) | ClientError::Status { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e)
        } else {
            ClientError::Transport(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
