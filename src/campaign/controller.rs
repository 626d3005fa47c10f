//! Campaign controller - top-level harvest orchestration
//!
//! This module contains the loop that coordinates a whole campaign:
//! - Expanding the seed query into its ordered variants
//! - Choosing where to resume from a saved checkpoint
//! - Running each variant through the `QueryRunner` in order
//! - Persisting the checkpoint on interrupt or fatal error, and removing it
//!   once every variant has been processed

use crate::campaign::client::SearchBackend;
use crate::campaign::fetcher::Fetcher;
use crate::campaign::query::{build_variants, QueryVariant};
use crate::campaign::runner::{QueryLimits, QueryReport, QueryRunner};
use crate::campaign::stall::StalledPageHandler;
use crate::state::{CampaignCheckpoint, CampaignStatus};
use crate::storage::{
    CheckpointLabels, CheckpointRecord, CheckpointResult, CheckpointStore, ResultSink,
};
use crate::HarvestError;
use std::future::Future;

/// Position in the variant list where a run begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// Index into the variant list (0 is the seed)
    pub index: usize,

    /// Page to start the first variant at
    pub page: u32,
}

impl ResumePoint {
    /// Page 1 of the seed query
    pub fn start() -> Self {
        Self { index: 0, page: 1 }
    }
}

impl Default for ResumePoint {
    fn default() -> Self {
        Self::start()
    }
}

/// Finds where a checkpoint says the campaign should continue
///
/// A checkpoint whose modifier index matches no variant (the modifier list
/// shrank, or the record is stale) falls back to the start of the seed.
pub fn resume_point(
    variants: &[QueryVariant],
    checkpoint: Option<&CampaignCheckpoint>,
) -> ResumePoint {
    let Some(checkpoint) = checkpoint else {
        return ResumePoint::start();
    };

    let Some(index) = variants.iter().position(|v| checkpoint.is_at(v)) else {
        tracing::warn!(
            "Could not find query \"{}\" (modifier index {:?}) in the current query list. Starting from the seed query.",
            checkpoint.query_text,
            checkpoint.modifier_index
        );
        return ResumePoint::start();
    };

    if variants[index].text != checkpoint.query_text {
        tracing::warn!(
            "Checkpoint query \"{}\" differs from rebuilt query \"{}\"; resuming at the same position.",
            checkpoint.query_text,
            variants[index].text
        );
    }

    ResumePoint {
        index,
        page: checkpoint.next_page.max(1),
    }
}

/// Fixed settings for a campaign run
#[derive(Debug, Clone)]
pub struct CampaignSettings {
    pub limits: QueryLimits,

    /// Written into every saved checkpoint
    pub labels: CheckpointLabels,
}

/// Outcome of `CampaignController::run`
#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub status: CampaignStatus,

    /// Rows added to the sink during this run
    pub saved_this_run: usize,

    /// Distinct URLs in the sink, across all runs
    pub known_urls: usize,

    /// One entry per variant that ran to a stop
    pub queries: Vec<QueryReport>,
}

impl CampaignReport {
    /// Number of variants that stopped on a failed or stalled page
    pub fn stopped_early(&self) -> usize {
        self.queries.iter().filter(|q| !q.stop.is_complete()).count()
    }
}

/// The parts of a campaign the variant loop mutates
struct Campaign<B, S> {
    variants: Vec<QueryVariant>,
    fetcher: Fetcher<B>,
    stall: StalledPageHandler,
    sink: S,
    limits: QueryLimits,
    checkpoint: CampaignCheckpoint,
    reports: Vec<QueryReport>,
}

impl<B: SearchBackend, S: ResultSink> Campaign<B, S> {
    async fn run_from(&mut self, start: ResumePoint) -> Result<(), HarvestError> {
        let total = self.variants.len();
        if start.index >= total {
            self.checkpoint.mark_exhausted(self.limits.max_pages);
            return Ok(());
        }

        self.checkpoint
            .point_at(&self.variants[start.index], start.page);

        for index in start.index..total {
            let start_page = if index == start.index { start.page } else { 1 };
            let variant = &self.variants[index];

            tracing::info!(
                "--- Processing query {}/{}: \"{}\" ---",
                index + 1,
                total,
                variant.text
            );

            let report = QueryRunner::new(
                &self.fetcher,
                &mut self.stall,
                &mut self.sink,
                self.limits,
            )
            .run(variant, start_page, &mut self.checkpoint)
            .await?;
            self.reports.push(report);

            match self.variants.get(index + 1) {
                Some(next) => self.checkpoint.point_at(next, 1),
                None => self.checkpoint.mark_exhausted(self.limits.max_pages),
            }
        }

        Ok(())
    }
}

/// Drives a seed query and its modifier variants through the backend
pub struct CampaignController<B, S> {
    campaign: Campaign<B, S>,
    store: CheckpointStore,
    labels: CheckpointLabels,
}

impl<B: SearchBackend, S: ResultSink> CampaignController<B, S> {
    /// Creates a controller for `seed` and its `modifiers`
    ///
    /// # Arguments
    ///
    /// * `seed` - The operator's base query
    /// * `modifiers` - Terms appended to the seed, in run order
    /// * `fetcher` - Paced, retrying access to the search backend
    /// * `stall` - Recovery for pages that come back empty
    /// * `sink` - Where new (title, URL) rows go
    /// * `store` - Durable checkpoint location
    /// * `settings` - Per-query limits and checkpoint labels
    pub fn new(
        seed: &str,
        modifiers: &[String],
        fetcher: Fetcher<B>,
        stall: StalledPageHandler,
        sink: S,
        store: CheckpointStore,
        settings: CampaignSettings,
    ) -> Self {
        let variants = build_variants(seed, modifiers);
        let checkpoint = CampaignCheckpoint::new(variants[0].text.clone());

        Self {
            campaign: Campaign {
                variants,
                fetcher,
                stall,
                sink,
                limits: settings.limits,
                checkpoint,
                reports: Vec::new(),
            },
            store,
            labels: settings.labels,
        }
    }

    /// The ordered query variants, seed first
    pub fn variants(&self) -> &[QueryVariant] {
        &self.campaign.variants
    }

    /// The in-memory resume position
    pub fn checkpoint(&self) -> &CampaignCheckpoint {
        &self.campaign.checkpoint
    }

    pub fn sink(&self) -> &S {
        &self.campaign.sink
    }

    pub fn fetcher(&self) -> &Fetcher<B> {
        &self.campaign.fetcher
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Writes the current position to the checkpoint store
    pub fn persist_checkpoint(&self) -> CheckpointResult<()> {
        let record = CheckpointRecord::new(&self.campaign.checkpoint, &self.labels);
        self.store.save(&record)?;
        tracing::info!(
            "Campaign state saved to {} (query \"{}\", page {}). Re-run to resume.",
            self.store.path().display(),
            record.position.query_text,
            record.position.next_page
        );
        Ok(())
    }

    /// Runs the campaign from `start` until it finishes or `shutdown` resolves
    ///
    /// # Returns
    ///
    /// * `Ok(report)` with `CampaignStatus::Completed` - every variant ran;
    ///   the checkpoint file has been removed
    /// * `Ok(report)` with `CampaignStatus::Interrupted` - `shutdown` fired;
    ///   the checkpoint has been saved (or the save failure logged)
    /// * `Err(HarvestError)` - a fatal error; the checkpoint has been saved
    ///   (or the save failure logged) before returning
    pub async fn run<F>(
        &mut self,
        start: ResumePoint,
        shutdown: F,
    ) -> Result<CampaignReport, HarvestError>
    where
        F: Future<Output = ()>,
    {
        let known_before = self.campaign.sink.known_urls();
        tracing::info!(
            "Starting campaign: {} queries, resuming at query {} page {}",
            self.campaign.variants.len(),
            start.index + 1,
            start.page
        );

        let finished = {
            tokio::pin!(shutdown);
            tokio::select! {
                biased;
                _ = &mut shutdown => None,
                result = self.campaign.run_from(start) => Some(result),
            }
        };

        let status = match finished {
            None => {
                tracing::warn!("Interrupt received. Saving state and exiting...");
                self.persist_or_log();
                CampaignStatus::Interrupted
            }
            Some(Err(e)) => {
                tracing::error!("Fatal error during campaign: {}", e);
                self.persist_or_log();
                return Err(e);
            }
            Some(Ok(())) => {
                match self.store.clear() {
                    Ok(true) => tracing::info!(
                        "Run completed. Removed state file {}",
                        self.store.path().display()
                    ),
                    Ok(false) => tracing::debug!("Run completed; no state file to remove"),
                    Err(e) => tracing::warn!(
                        "Could not remove state file {}: {}",
                        self.store.path().display(),
                        e
                    ),
                }
                CampaignStatus::Completed
            }
        };

        let known_urls = self.campaign.sink.known_urls();
        Ok(CampaignReport {
            status,
            saved_this_run: known_urls.saturating_sub(known_before),
            known_urls,
            queries: std::mem::take(&mut self.campaign.reports),
        })
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist_checkpoint() {
            tracing::error!(
                "Error saving state to {}: {}",
                self.store.path().display(),
                e
            );
        }
    }
}
