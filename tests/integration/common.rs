//! Shared helpers for the integration tests

use query_harvest::campaign::{Fetcher, PacingPolicy, RetryPolicy, SearxClient};
use query_harvest::config::{BackendConfig, SearchConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::{MockServer, Request, ResponseTemplate};

/// Builds a client for the mock server's `/search` endpoint with no settle delay
pub fn client_for(server: &MockServer) -> SearxClient {
    let backend = BackendConfig {
        url: format!("{}/search", server.uri()),
        request_timeout: 5,
        ..BackendConfig::default()
    };

    SearxClient::new(&backend, &SearchConfig::default())
        .expect("Failed to build client")
        .with_settle_delay(Duration::ZERO)
}

/// A fetcher that retries `attempts` times without pacing or backoff
pub fn fetcher_for(server: &MockServer, attempts: u32) -> Fetcher<SearxClient> {
    Fetcher::new(
        client_for(server),
        RetryPolicy::immediate(attempts),
        PacingPolicy::immediate(),
    )
}

/// A 200 response carrying the given (title, url) results
pub fn results(items: &[(&str, &str)]) -> ResponseTemplate {
    let results: Vec<_> = items
        .iter()
        .map(|(title, url)| json!({ "title": title, "url": url, "engine": "mock" }))
        .collect();

    ResponseTemplate::new(200).set_body_json(json!({ "query": "mock", "results": results }))
}

/// The (q, pageno) pair of a received request
pub fn query_and_page(request: &Request) -> (String, String) {
    let mut q = String::new();
    let mut page = String::new();
    for (key, value) in request.url.query_pairs() {
        match key.as_ref() {
            "q" => q = value.into_owned(),
            "pageno" => page = value.into_owned(),
            _ => {}
        }
    }
    (q, page)
}
