//! Search backend client
//!
//! This module handles the single-attempt HTTP request for one page of
//! results, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Encoding the query parameters the backend expects
//! - Classifying failures (timeout, connection, status, malformed body)
//!
//! Retrying and pacing live one level up, in the fetcher.

use crate::campaign::parser::{parse_results, SearchHit};
use crate::campaign::seconds;
use crate::config::{BackendConfig, SearchConfig};
use crate::{FetchError, HarvestError};
use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// One attempt at fetching a page of search results
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Requests page `page` (1-based) of results for `query`
    ///
    /// A successful response with no hits is `Ok(vec![])`, not an error.
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchHit>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The backend configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &BackendConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// JSON search client for a SearXNG-compatible endpoint
#[derive(Debug, Clone)]
pub struct SearxClient {
    client: Client,
    endpoint: Url,
    search: SearchConfig,
    settle_delay: Duration,
}

impl SearxClient {
    /// Creates a client for the configured endpoint
    pub fn new(backend: &BackendConfig, search: &SearchConfig) -> Result<Self, HarvestError> {
        let endpoint = Url::parse(&backend.url).map_err(|e| {
            crate::ConfigError::InvalidUrl(format!("Invalid backend url '{}': {}", backend.url, e))
        })?;

        Ok(Self {
            client: build_http_client(backend)?,
            endpoint,
            search: search.clone(),
            settle_delay: seconds(backend.settle_delay),
        })
    }

    /// Overrides the post-response settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for SearxClient {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchHit>, FetchError> {
        let page_number = page.to_string();
        let safesearch = self.search.safesearch.to_string();
        let params = [
            ("q", query),
            ("format", "json"),
            ("pageno", page_number.as_str()),
            ("language", self.search.language.as_str()),
            ("categories", self.search.categories.as_str()),
            ("safesearch", safesearch.as_str()),
        ];

        tracing::info!("Searching (page {}) for: \"{}\"", page, query);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if status == StatusCode::TOO_MANY_REQUESTS {
            match &retry_after {
                Some(wait) => tracing::warn!(
                    "Rate limited (429) on page {} for query \"{}\". Server suggests waiting {} seconds.",
                    page,
                    query,
                    wait
                ),
                None => tracing::warn!(
                    "Rate limited (429) on page {} for query \"{}\".",
                    page,
                    query
                ),
            }
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                retry_after,
            });
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let body = response.text().await?;
        let hits = parse_results(&body)?;

        if hits.is_empty() {
            tracing::info!(
                "Page {} for query \"{}\" returned 0 result items.",
                page,
                query
            );
        } else {
            tracing::debug!("Retrieved {} result items from page {}", hits.len(), page);
        }

        Ok(hits)
    }
}
