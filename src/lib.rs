//! Query-Harvest: a resumable search-result harvester
//!
//! This crate drives a search backend through a seed query and its modifier
//! variants, page by page, saving newly discovered (title, URL) pairs to a CSV
//! file and checkpointing its position so an interrupted run can pick up
//! exactly where it stopped.

pub mod campaign;
pub mod config;
pub mod console;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Query-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] storage::CheckpointError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// A single failed attempt against the search backend.
///
/// Every variant is retryable; the fetcher decides when to give up.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {status}")]
    Status {
        status: u16,
        retry_after: Option<String>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Returns true if the backend signalled rate limiting (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Result type alias for Query-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use campaign::{CampaignController, QueryVariant, ResultItem};
pub use config::Config;
pub use state::{CampaignCheckpoint, QueryStop};
