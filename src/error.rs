use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the edges of the pipeline.
///
/// Nothing in the aggregation, normalization or rendering stages fails in
/// normal operation; `MissingDay` only fires when a non-finalized dataset
/// reaches the renderer.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("dataset has no record for {0}; it must be finalized before rendering")]
    MissingDay(NaiveDate),

    #[error("invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("failed to draw {path}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures inside a cache backend. Never surfaced past `CacheManager`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("cache entry stored under {found} but requested as {expected}")]
    KeyMismatch { expected: String, found: String },

    #[error("cache backend task failed: {0}")]
    Task(String),
}

/// Failures fetching raw events. Absorbed into an empty event list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read events from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
