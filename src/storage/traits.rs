//! Storage traits and error types
//!
//! This module defines the trait interface for result sinks and the error
//! types shared by the storage layer.

use crate::campaign::ResultItem;
use thiserror::Error;

/// Errors that can occur while appending to or reading the result sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading or writing the checkpoint record
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid checkpoint: {0}")]
    Invalid(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Append-only, deduplicating store of (title, URL) rows
///
/// Implementations own the set of every URL ever persisted. A URL enters
/// that set if and only if a row carrying it was durably appended.
pub trait ResultSink {
    /// Appends every well-formed item whose URL has not been stored before
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - Number of rows actually written (0 if all were duplicates)
    /// * `Err(SinkError)` - The write failed; no URL from this call is
    ///   considered stored
    fn append(&mut self, items: &[ResultItem]) -> SinkResult<usize>;

    /// Returns true if a row with this URL has been stored
    fn contains(&self, url: &str) -> bool;

    /// Number of distinct URLs stored across all runs
    fn known_urls(&self) -> usize;
}
