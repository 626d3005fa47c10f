//! Per-query pagination
//!
//! Walks the pages of one query variant until the quota of new items is
//! met, the page limit is reached, a page fails for good, or a stalled page
//! stays empty after its retry. The campaign checkpoint is pointed at each
//! page before it is fetched, and past it once its results are stored.

use crate::campaign::client::SearchBackend;
use crate::campaign::fetcher::{FetchOutcome, Fetcher};
use crate::campaign::parser::{ResultItem, SearchHit};
use crate::campaign::query::QueryVariant;
use crate::campaign::stall::{StallOutcome, StalledPageHandler};
use crate::state::{CampaignCheckpoint, QueryStop};
use crate::storage::ResultSink;
use crate::HarvestError;

/// Per-query bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    /// New items wanted for each query
    pub quota: usize,

    /// Highest page number ever requested
    pub max_pages: u32,
}

impl QueryLimits {
    pub fn from_config(config: &crate::config::CampaignConfig) -> Self {
        Self {
            quota: config.quota,
            max_pages: config.max_pages,
        }
    }
}

/// Summary of one query variant's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub query: String,

    /// New rows written to the sink for this query
    pub saved: usize,

    /// Pages requested, not counting stalled-page retries
    pub pages_attempted: u32,

    pub stop: QueryStop,
}

/// Drives pagination for one query at a time
pub struct QueryRunner<'a, B, S> {
    fetcher: &'a Fetcher<B>,
    stall: &'a mut StalledPageHandler,
    sink: &'a mut S,
    limits: QueryLimits,
}

impl<'a, B, S> QueryRunner<'a, B, S>
where
    B: SearchBackend,
    S: ResultSink,
{
    pub fn new(
        fetcher: &'a Fetcher<B>,
        stall: &'a mut StalledPageHandler,
        sink: &'a mut S,
        limits: QueryLimits,
    ) -> Self {
        Self {
            fetcher,
            stall,
            sink,
            limits,
        }
    }

    /// Runs `variant` from `start_page` until one of its stop conditions
    ///
    /// Every page's new unique items are saved, so `saved` may pass the
    /// quota on the last page.
    ///
    /// # Returns
    ///
    /// * `Ok(QueryReport)` - The query stopped for one of the `QueryStop` reasons
    /// * `Err(HarvestError::Sink)` - Results could not be written; the
    ///   checkpoint still points at the page whose results were lost
    pub async fn run(
        &mut self,
        variant: &QueryVariant,
        start_page: u32,
        checkpoint: &mut CampaignCheckpoint,
    ) -> Result<QueryReport, HarvestError> {
        let query = variant.text.as_str();
        let mut page = start_page.max(1);
        let mut saved = 0;
        let mut pages_attempted = 0;

        tracing::info!(
            "Fetching up to {} new items, across max {} pages for query: \"{}\" (starting page {})",
            self.limits.quota,
            self.limits.max_pages,
            query,
            page
        );

        let stop = loop {
            if page > self.limits.max_pages {
                tracing::info!(
                    "Reached maximum page limit ({}) for query \"{}\".",
                    self.limits.max_pages,
                    query
                );
                break QueryStop::PageLimit;
            }

            checkpoint.point_at(variant, page);
            pages_attempted += 1;

            let hits = match self.fetcher.fetch_page(query, page).await {
                FetchOutcome::Success(hits) => hits,
                FetchOutcome::EmptyPage => match self.stall.recover(self.fetcher, query, page).await
                {
                    StallOutcome::Recovered(hits) => hits,
                    StallOutcome::GiveUp => break QueryStop::Stalled,
                },
                FetchOutcome::Failure(e) => {
                    tracing::error!(
                        "Persistent failure fetching page {} for query \"{}\" ({}). Stopping for this query.",
                        page,
                        query,
                        e
                    );
                    break QueryStop::FetchFailed;
                }
            };

            let items = well_formed(hits);
            let written = if items.is_empty() {
                tracing::info!(
                    "No usable results on page {} for \"{}\".",
                    page,
                    query
                );
                0
            } else {
                self.sink.append(&items)?
            };

            saved += written;
            if written > 0 {
                tracing::info!(
                    "Saved {} new items from page {} for \"{}\". Total for this query: {}.",
                    written,
                    page,
                    query,
                    saved
                );
            } else {
                tracing::debug!("Page {} for \"{}\" held nothing new", page, query);
            }

            let next = page.checked_add(1);
            if let Some(next) = next {
                page = next;
                checkpoint.point_at(variant, page);
            }

            if saved >= self.limits.quota {
                tracing::info!(
                    "Reached target of {} new items for query \"{}\".",
                    self.limits.quota,
                    query
                );
                break QueryStop::QuotaMet;
            }

            // Page numbers are exhausted
            if next.is_none() {
                tracing::info!("Reached the last page number for query \"{}\".", query);
                break QueryStop::PageLimit;
            }
        };

        tracing::info!(
            "Finished \"{}\": {} new items over {} pages ({})",
            query,
            saved,
            pages_attempted,
            stop
        );

        Ok(QueryReport {
            query: query.to_string(),
            saved,
            pages_attempted,
            stop,
        })
    }
}

fn well_formed(hits: Vec<SearchHit>) -> Vec<ResultItem> {
    hits.into_iter().filter_map(SearchHit::into_item).collect()
}
