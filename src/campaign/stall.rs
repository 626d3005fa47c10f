//! Stalled-page recovery
//!
//! A page that comes back successfully but empty usually means the backend
//! is throttling quietly. The handler pauses (optionally cut short by an
//! operator "retry now" signal), then retries the page exactly once.

use crate::campaign::client::SearchBackend;
use crate::campaign::fetcher::{FetchOutcome, Fetcher};
use crate::campaign::parser::SearchHit;
use std::time::Duration;
use tokio::sync::mpsc;

/// Creates a connected retry trigger and signal
pub fn retry_channel() -> (RetryTrigger, RetrySignal) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RetryTrigger { tx }, RetrySignal { rx })
}

/// Sending half: fired by whoever listens for the operator
#[derive(Debug, Clone)]
pub struct RetryTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl RetryTrigger {
    /// Requests that the current pause end now
    ///
    /// Returns false if the handler has gone away.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Receiving half, owned by the stalled-page handler
#[derive(Debug)]
pub struct RetrySignal {
    rx: mpsc::UnboundedReceiver<()>,
}

impl RetrySignal {
    /// Discards requests that arrived outside a pause
    fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    /// Resolves to true on the next request, or false once every trigger
    /// has been dropped
    async fn requested(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// What the caller should do with the stalled page
#[derive(Debug)]
pub enum StallOutcome {
    /// The retry produced hits; use them as the page's results
    Recovered(Vec<SearchHit>),

    /// The retry was empty or failed; stop this query
    GiveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseEnd {
    Signalled,
    Elapsed,
}

impl PauseEnd {
    fn reason(&self) -> &'static str {
        match self {
            Self::Signalled => "operator request",
            Self::Elapsed => "automatic timeout",
        }
    }
}

/// One-shot pause-and-retry for empty pages
#[derive(Debug)]
pub struct StalledPageHandler {
    pause: Duration,
    signal: Option<RetrySignal>,
}

impl StalledPageHandler {
    /// An unattended handler: every pause runs its full length
    pub fn new(pause: Duration) -> Self {
        Self {
            pause,
            signal: None,
        }
    }

    /// Lets `signal` end pauses early
    pub fn with_retry_signal(mut self, signal: RetrySignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Returns true if an operator can cut pauses short
    pub fn is_attended(&self) -> bool {
        self.signal.is_some()
    }

    /// Pauses, then fetches `page` of `query` one more time
    ///
    /// Never recurses: a second empty page is final for this query.
    pub async fn recover<B: SearchBackend>(
        &mut self,
        fetcher: &Fetcher<B>,
        query: &str,
        page: u32,
    ) -> StallOutcome {
        tracing::info!(
            "No results on page {} for query \"{}\". Pausing for up to {} seconds before retrying.",
            page,
            query,
            self.pause.as_secs()
        );

        let end = self.pause().await;
        tracing::info!(
            "Retrying page {} for \"{}\" due to {}.",
            page,
            query,
            end.reason()
        );

        match fetcher.fetch_page(query, page).await {
            FetchOutcome::Success(hits) => StallOutcome::Recovered(hits),
            FetchOutcome::EmptyPage => {
                tracing::warn!(
                    "Still no results on page {} after {} retry. Stopping collection for \"{}\".",
                    page,
                    end.reason(),
                    query
                );
                StallOutcome::GiveUp
            }
            FetchOutcome::Failure(e) => {
                tracing::warn!(
                    "Failed to fetch page {} for \"{}\" on {} retry: {}",
                    page,
                    query,
                    end.reason(),
                    e
                );
                StallOutcome::GiveUp
            }
        }
    }

    async fn pause(&mut self) -> PauseEnd {
        let timer = tokio::time::sleep(self.pause);

        match self.signal.as_mut() {
            Some(signal) => {
                signal.drain();
                tracing::info!("Type 'r' and press Enter to retry immediately.");
                tokio::select! {
                    _ = timer => PauseEnd::Elapsed,
                    true = signal.requested() => PauseEnd::Signalled,
                }
            }
            None => {
                timer.await;
                PauseEnd::Elapsed
            }
        }
    }
}
