//! Full campaigns against a mock search server with a real CSV sink

use crate::common::{fetcher_for, query_and_page, results};
use query_harvest::campaign::{
    resume_point, CampaignController, CampaignSettings, QueryLimits, ResumePoint,
    StalledPageHandler, SearxClient,
};
use query_harvest::state::{CampaignCheckpoint, CampaignStatus, QueryStop};
use query_harvest::storage::{
    csv::parse_records, CheckpointLabels, CheckpointRecord, CheckpointStore, CsvSink, ResultSink,
};
use query_harvest::QueryVariant;
use std::fs;
use std::future::pending;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

fn modifiers(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn labels(output: &Path) -> CheckpointLabels {
    CheckpointLabels {
        modifier_file: "modifiers.csv".to_string(),
        output_file: output.display().to_string(),
        config_hash: None,
    }
}

fn build_controller(
    server: &MockServer,
    dir: &TempDir,
    seed: &str,
    terms: &[&str],
    limits: QueryLimits,
) -> CampaignController<SearxClient, CsvSink> {
    let output = dir.path().join("queries_with_urls.csv");
    let sink = CsvSink::open(&output, "search_query_title", "url").expect("Failed to open sink");

    CampaignController::new(
        seed,
        &modifiers(terms),
        fetcher_for(server, 1),
        StalledPageHandler::new(Duration::ZERO),
        sink,
        CheckpointStore::new(dir.path().join("state.json")),
        CampaignSettings {
            limits,
            labels: labels(&output),
        },
    )
}

async fn mock_page(server: &MockServer, query: &str, page: u32, items: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .and(query_param("pageno", page.to_string()))
        .respond_with(results(items))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cats_campaign_skips_duplicates_and_moves_on() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("queries_with_urls.csv");

    // A previous run already saved one of the URLs
    fs::write(
        &output,
        "search_query_title,url\nOld cats,https://dup.example/\n",
    )
    .unwrap();

    mock_page(
        &mock_server,
        "cats",
        1,
        &[
            ("Cats one", "https://one.example/"),
            ("Cats again", "https://dup.example/"),
            ("Cats two", "https://two.example/"),
        ],
    )
    .await;
    mock_page(&mock_server, "cats images", 1, &[("Cat image", "https://img.example/")]).await;
    mock_page(&mock_server, "cats gifs", 1, &[("Cat gif", "https://gif.example/")]).await;

    let mut controller = build_controller(
        &mock_server,
        &dir,
        "cats",
        &["images", "gifs"],
        QueryLimits {
            quota: 2,
            max_pages: 1,
        },
    );
    let report = controller
        .run(ResumePoint::start(), pending())
        .await
        .expect("Campaign should complete");

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.queries[0].query, "cats");
    assert_eq!(report.queries[0].saved, 2);
    assert_eq!(report.queries[0].stop, QueryStop::QuotaMet);
    assert_eq!(report.queries[1].query, "cats images");
    assert_eq!(report.queries[1].stop, QueryStop::PageLimit);
    assert_eq!(report.saved_this_run, 4);
    assert_eq!(report.known_urls, 5);

    // "cats images" is requested next, from page 1
    let requests = mock_server.received_requests().await.unwrap();
    let order: Vec<_> = requests.iter().map(query_and_page).collect();
    assert_eq!(
        order,
        vec![
            ("cats".to_string(), "1".to_string()),
            ("cats images".to_string(), "1".to_string()),
            ("cats gifs".to_string(), "1".to_string()),
        ]
    );

    let rows = parse_records(&fs::read_to_string(&output).unwrap());
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2], vec!["Cats one".to_string(), "https://one.example/".to_string()]);
    assert_eq!(rows[3], vec!["Cats two".to_string(), "https://two.example/".to_string()]);
    assert_eq!(
        rows.iter().filter(|r| r[1] == "https://dup.example/").count(),
        1
    );

    assert!(!dir.path().join("state.json").exists());
}

#[tokio::test]
async fn test_resume_from_saved_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("queries_with_urls.csv");

    // An earlier run stopped on page 3 of "cats gifs"
    let store = CheckpointStore::new(dir.path().join("state.json"));
    let mut position = CampaignCheckpoint::new("cats");
    position.point_at(
        &QueryVariant {
            text: "cats gifs".to_string(),
            modifier_index: Some(1),
        },
        3,
    );
    store
        .save(&CheckpointRecord::new(&position, &labels(&output)))
        .unwrap();

    mock_page(&mock_server, "cats gifs", 3, &[("Late gif", "https://late.example/")]).await;

    let saved = store.load_or_discard().expect("Checkpoint should load");
    let mut controller = build_controller(
        &mock_server,
        &dir,
        &saved.position.seed_query,
        &["images", "gifs"],
        QueryLimits {
            quota: 6,
            max_pages: 3,
        },
    );
    let start = resume_point(controller.variants(), Some(&saved.position));
    assert_eq!(start, ResumePoint { index: 2, page: 3 });

    let report = controller.run(start, pending()).await.unwrap();

    assert_eq!(report.status, CampaignStatus::Completed);
    assert_eq!(report.queries.len(), 1);
    assert_eq!(report.saved_this_run, 1);
    assert!(controller.sink().contains("https://late.example/"));

    let requests = mock_server.received_requests().await.unwrap();
    let order: Vec<_> = requests.iter().map(query_and_page).collect();
    assert_eq!(order, vec![("cats gifs".to_string(), "3".to_string())]);

    assert!(!store.exists());
}

#[tokio::test]
async fn test_interrupted_campaign_leaves_resumable_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mock_page(&mock_server, "cats", 1, &[("Cats", "https://cats.example/")]).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cats"))
        .and(query_param("pageno", "2"))
        .respond_with(results(&[("Slow", "https://slow.example/")]).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut controller = build_controller(
        &mock_server,
        &dir,
        "cats",
        &["images"],
        QueryLimits {
            quota: 10,
            max_pages: 5,
        },
    );
    let report = controller
        .run(
            ResumePoint::start(),
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await
        .unwrap();

    assert_eq!(report.status, CampaignStatus::Interrupted);
    assert_eq!(report.saved_this_run, 1);

    let saved = controller
        .store()
        .load()
        .unwrap()
        .expect("Interrupt should write a checkpoint");
    assert_eq!(saved.position.query_text, "cats");
    assert_eq!(saved.position.next_page, 2);
    assert!(!controller.sink().contains("https://slow.example/"));
}
