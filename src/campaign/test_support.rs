//! Scripted backend and in-memory sink for unit tests

use crate::campaign::client::SearchBackend;
use crate::campaign::parser::{ResultItem, SearchHit};
use crate::storage::{ResultSink, SinkError, SinkResult};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::Mutex;

type Key = (String, u32);

pub(crate) fn hit(title: &str, url: &str) -> SearchHit {
    SearchHit {
        title: Some(title.to_string()),
        url: Some(url.to_string()),
    }
}

/// Builds `count` distinct hits whose URLs start with `prefix`
pub(crate) fn hits(prefix: &str, count: usize) -> Vec<SearchHit> {
    (0..count)
        .map(|i| hit(&format!("{} {}", prefix, i), &format!("https://{}.example/{}", prefix, i)))
        .collect()
}

/// Backend that replays queued responses per (query, page)
///
/// Unscripted requests get an empty page.
#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    responses: Mutex<HashMap<Key, VecDeque<Result<Vec<SearchHit>, FetchError>>>>,
    calls: Mutex<Vec<Key>>,
    hang: Option<Key>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues one response for `query` page `page`
    pub(crate) fn respond(
        self,
        query: &str,
        page: u32,
        response: Result<Vec<SearchHit>, FetchError>,
    ) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((query.to_string(), page))
            .or_default()
            .push_back(response);
        self
    }

    /// Makes requests for `query` page `page` never complete
    pub(crate) fn hang_on(mut self, query: &str, page: u32) -> Self {
        self.hang = Some((query.to_string(), page));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, query: &str, page: u32) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(q, p)| q == query && *p == page)
            .count()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchHit>, FetchError> {
        let key = (query.to_string(), page);
        self.calls.lock().unwrap().push(key.clone());

        if self.hang.as_ref() == Some(&key) {
            std::future::pending::<()>().await;
        }

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Sink that keeps rows in memory
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub(crate) rows: Vec<ResultItem>,
    seen: HashSet<String>,
    fail_next: bool,
}

impl MemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_urls(urls: &[&str]) -> Self {
        Self {
            seen: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Makes the next non-empty append fail
    pub(crate) fn fail_next_append(&mut self) {
        self.fail_next = true;
    }
}

impl ResultSink for MemorySink {
    fn append(&mut self, items: &[ResultItem]) -> SinkResult<usize> {
        let fresh: Vec<&ResultItem> = items
            .iter()
            .filter(|item| !self.seen.contains(&item.url))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        if self.fail_next {
            self.fail_next = false;
            return Err(SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
        }

        let mut written = 0;
        for item in fresh {
            if self.seen.insert(item.url.clone()) {
                self.rows.push(item.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    fn known_urls(&self) -> usize {
        self.seen.len()
    }
}
