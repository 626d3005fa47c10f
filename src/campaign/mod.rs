//! Campaign module for running search-query harvests
//!
//! This module contains everything between the configuration and the
//! filesystem:
//! - The search backend client and response parser
//! - Paced, retrying page fetches
//! - Stalled-page recovery with an optional operator retry signal
//! - Per-query pagination and the campaign controller that ties it together

mod client;
mod controller;
mod fetcher;
mod parser;
mod query;
mod runner;
mod stall;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

pub use client::{build_http_client, SearchBackend, SearxClient};
pub use controller::{
    resume_point, CampaignController, CampaignReport, CampaignSettings, ResumePoint,
};
pub use fetcher::{FetchOutcome, Fetcher, PacingPolicy, RetryPolicy};
pub use parser::{parse_results, ResultItem, SearchHit};
pub use query::{build_variants, QueryVariant};
pub use runner::{QueryLimits, QueryReport, QueryRunner};
pub use stall::{retry_channel, RetrySignal, RetryTrigger, StallOutcome, StalledPageHandler};

/// Converts a configured number of seconds into a `Duration`
///
/// Negative and NaN values become zero; values too large to represent
/// saturate.
pub(crate) fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
