//! Paced, retrying page fetcher
//!
//! Wraps a `SearchBackend` with:
//! - A random delay before every attempt, to stay under rate limits
//! - Automatic retries with exponential backoff on any attempt failure
//! - Classification of the final result into a `FetchOutcome`
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Timeout / connection error | Retry with backoff |
//! | Non-2xx status (incl. 429) | Retry with backoff |
//! | Malformed body | Retry with backoff |
//! | 2xx with no hits | `EmptyPage`, no retry |
//! | Attempts exhausted | `Failure` |

use crate::campaign::client::SearchBackend;
use crate::campaign::parser::SearchHit;
use crate::campaign::seconds;
use crate::config::{PacingConfig, RetryConfig};
use crate::FetchError;
use rand::Rng;
use std::time::Duration;

/// Result of fetching one page, after all retries
#[derive(Debug)]
pub enum FetchOutcome {
    /// The backend returned at least one hit
    Success(Vec<SearchHit>),

    /// The backend answered successfully but with zero hits
    EmptyPage,

    /// Every attempt failed; carries the last error
    Failure(FetchError),
}

impl FetchOutcome {
    /// Folds a single attempt result into an outcome
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            Self::EmptyPage
        } else {
            Self::Success(hits)
        }
    }
}

/// How many times to attempt a page and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    pub multiplier: f64,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            multiplier: config.multiplier,
            min_wait: seconds(config.min_wait),
            max_wait: seconds(config.max_wait),
        }
    }

    /// A policy that retries `attempts` times without waiting
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            multiplier: 0.0,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Wait after the given failed attempt (1-based):
    /// `multiplier * 2^(attempt - 1)` seconds, clamped to `[min_wait, max_wait]`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(62) as i32;
        let raw = seconds(self.multiplier * 2f64.powi(exponent));
        raw.max(self.min_wait).min(self.max_wait)
    }
}

/// Random delay applied before every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl PacingPolicy {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            min_delay: seconds(config.min_delay),
            max_delay: seconds(config.max_delay),
        }
    }

    /// No delay at all
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Draws a delay uniformly from `[min_delay, max_delay]`
    pub fn next_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let secs = rand::rng()
            .random_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        seconds(secs)
    }
}

/// Fetches pages from a backend with pacing and retries
#[derive(Debug)]
pub struct Fetcher<B> {
    backend: B,
    retry: RetryPolicy,
    pacing: PacingPolicy,
}

impl<B: SearchBackend> Fetcher<B> {
    pub fn new(backend: B, retry: RetryPolicy, pacing: PacingPolicy) -> Self {
        Self {
            backend,
            retry,
            pacing,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetches one page, retrying failed attempts
    ///
    /// An empty page is returned as `EmptyPage` right away; only attempt
    /// failures are retried.
    pub async fn fetch_page(&self, query: &str, page: u32) -> FetchOutcome {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let delay = self.pacing.next_delay();
            if !delay.is_zero() {
                tracing::debug!(
                    "Waiting {:.2}s before querying page {} of \"{}\"",
                    delay.as_secs_f64(),
                    page,
                    query
                );
                tokio::time::sleep(delay).await;
            }

            let error = match self.backend.search(query, page).await {
                Ok(hits) => return FetchOutcome::from_hits(hits),
                Err(e) => e,
            };

            if attempt >= self.retry.attempts {
                tracing::error!(
                    "Giving up on page {} for \"{}\" after {} attempts: {}",
                    page,
                    query,
                    attempt,
                    error
                );
                return FetchOutcome::Failure(error);
            }

            let wait = self.retry.backoff(attempt);
            tracing::warn!(
                query,
                page,
                attempt,
                wait_secs = wait.as_secs_f64(),
                rate_limited = error.is_rate_limited(),
                "Fetch attempt failed ({}), retrying after backoff",
                error
            );
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::test_support::{hit, ScriptedBackend};

    #[test]
    fn test_backoff_is_exponential_and_clamped() {
        let policy = RetryPolicy {
            attempts: 5,
            multiplier: 1.0,
            min_wait: Duration::from_secs(2),
            max_wait: Duration::from_secs(10),
        };

        assert_eq!(policy.backoff(1), Duration::from_secs(2)); // 1s raised to min
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(5), Duration::from_secs(10)); // 16s capped
        assert_eq!(policy.backoff(200), Duration::from_secs(10));
    }

    #[test]
    fn test_default_backoff_matches_config() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_secs(30));
        assert_eq!(policy.backoff(9), Duration::from_secs(256));
        assert_eq!(policy.backoff(10), Duration::from_secs(300));
    }

    #[test]
    fn test_pacing_stays_in_window() {
        let pacing = PacingPolicy {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(200),
        };
        for _ in 0..100 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(200));
        }

        assert_eq!(PacingPolicy::immediate().next_delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let backend = ScriptedBackend::new().respond("cats", 1, Ok(vec![hit("Cats", "https://a/")]));
        let fetcher = Fetcher::new(backend, RetryPolicy::immediate(3), PacingPolicy::immediate());

        let outcome = fetcher.fetch_page("cats", 1).await;
        assert!(matches!(outcome, FetchOutcome::Success(ref hits) if hits.len() == 1));
        assert_eq!(fetcher.backend().calls_for("cats", 1), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let backend = ScriptedBackend::new()
            .respond("cats", 1, Err(FetchError::Timeout))
            .respond(
                "cats",
                1,
                Err(FetchError::Status {
                    status: 429,
                    retry_after: Some("5".to_string()),
                }),
            )
            .respond("cats", 1, Ok(vec![hit("Cats", "https://a/")]));
        let fetcher = Fetcher::new(backend, RetryPolicy::immediate(3), PacingPolicy::immediate());

        let outcome = fetcher.fetch_page("cats", 1).await;
        assert!(matches!(outcome, FetchOutcome::Success(_)));
        assert_eq!(fetcher.backend().calls_for("cats", 1), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_fail() {
        let backend = ScriptedBackend::new()
            .respond("cats", 1, Err(FetchError::Connect("refused".to_string())))
            .respond("cats", 1, Err(FetchError::Decode("bad json".to_string())));
        let fetcher = Fetcher::new(backend, RetryPolicy::immediate(2), PacingPolicy::immediate());

        let outcome = fetcher.fetch_page("cats", 1).await;
        assert!(matches!(outcome, FetchOutcome::Failure(FetchError::Decode(_))));
        assert_eq!(fetcher.backend().calls_for("cats", 1), 2);
    }

    #[tokio::test]
    async fn test_empty_page_is_not_retried() {
        let backend = ScriptedBackend::new().respond("cats", 1, Ok(vec![]));
        let fetcher = Fetcher::new(backend, RetryPolicy::immediate(3), PacingPolicy::immediate());

        let outcome = fetcher.fetch_page("cats", 1).await;
        assert!(matches!(outcome, FetchOutcome::EmptyPage));
        assert_eq!(fetcher.backend().calls_for("cats", 1), 1);
    }
}
