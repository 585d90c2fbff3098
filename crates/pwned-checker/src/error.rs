//! Checker error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Cannot read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] pwned_core::Error),

    #[error(transparent)]
    Client(#[from] pwned_client::ClientError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CheckerError>;
