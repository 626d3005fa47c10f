//! Backend client and fetcher behavior against a mock search server

use crate::common::{client_for, fetcher_for, results};
use query_harvest::campaign::{FetchOutcome, SearchBackend};
use query_harvest::FetchError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_sends_expected_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cats images"))
        .and(query_param("format", "json"))
        .and(query_param("pageno", "2"))
        .and(query_param("language", "en-US"))
        .and(query_param("categories", "general"))
        .and(query_param("safesearch", "0"))
        .respond_with(results(&[
            ("Cat pictures", "https://pics.example/cats"),
            ("Cat gallery", "https://gallery.example/"),
        ]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let hits = client_for(&mock_server)
        .search("cats images", 2)
        .await
        .expect("Search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title.as_deref(), Some("Cat pictures"));
    assert_eq!(hits[1].url.as_deref(), Some("https://gallery.example/"));
}

#[tokio::test]
async fn test_rate_limited_attempt_is_retried() {
    let mock_server = MockServer::start().await;

    // First request is throttled, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(results(&[("Cats", "https://cats.example/")]))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 3);
    let outcome = fetcher.fetch_page("cats", 1).await;

    assert!(matches!(outcome, FetchOutcome::Success(ref hits) if hits.len() == 1));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .search("cats", 1)
        .await
        .expect_err("429 should be an error");

    assert!(error.is_rate_limited());
    assert!(matches!(
        error,
        FetchError::Status { status: 429, retry_after: Some(ref wait) } if wait == "120"
    ));
}

#[tokio::test]
async fn test_malformed_body_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 3);
    let outcome = fetcher.fetch_page("cats", 1).await;

    assert!(matches!(outcome, FetchOutcome::Failure(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_server_error_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 2);
    let outcome = fetcher.fetch_page("cats", 1).await;

    assert!(matches!(
        outcome,
        FetchOutcome::Failure(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_empty_results_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"query": "cats", "results": []}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 3);
    let outcome = fetcher.fetch_page("cats", 1).await;

    assert!(matches!(outcome, FetchOutcome::EmptyPage));
}

#[tokio::test]
async fn test_missing_results_field_is_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"query": "cats"}"#))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_for(&mock_server, 3);
    assert!(matches!(
        fetcher.fetch_page("cats", 1).await,
        FetchOutcome::EmptyPage
    ));
}
