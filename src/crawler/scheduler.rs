//! Scheduler for the recursive crawl
//!
//! Every candidate URL becomes one independently spawned task. A task:
//! - waits for an admission-gate slot (held until it returns)
//! - checks the page limit and the host
//! - claims the normalized key, fetches, extracts and records the page
//! - registers and spawns one child task per outgoing link
//!
//! Registration with the completion barrier always happens before the spawn,
//! so the barrier cannot clear while a child is scheduled but not yet running.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::extract_page_data;
use crate::state::CrawlState;
use crate::url::{normalize_url, same_host};
use std::sync::Arc;
use url::Url;

/// Log a progress line every this many processed pages
const PROGRESS_INTERVAL: usize = 10;

/// How a single visit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The page limit was already reached
    OverCapacity,
    /// The candidate URL did not parse
    InvalidUrl,
    /// The candidate is on another host and is not followed
    OffHost,
    /// Another worker already claimed this page
    AlreadyClaimed,
    /// The fetch failed; the key is marked failed
    FetchFailed,
    /// The page was recorded and `children` tasks were spawned
    Processed { children: usize },
}

/// Spawns and runs crawl workers against a shared [`CrawlState`]
pub struct Scheduler<F: Fetcher> {
    state: Arc<CrawlState>,
    fetcher: Arc<F>,
    base_host: Arc<str>,
}

// Manual impl: cloning only bumps reference counts, `F` need not be Clone
impl<F: Fetcher> Clone for Scheduler<F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fetcher: Arc::clone(&self.fetcher),
            base_host: Arc::clone(&self.base_host),
        }
    }
}

impl<F: Fetcher> Scheduler<F> {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `state` - Shared crawl state
    /// * `fetcher` - Page source shared by all workers
    /// * `base_host` - The only host whose pages are fetched
    pub fn new(state: Arc<CrawlState>, fetcher: Arc<F>, base_host: &str) -> Self {
        Self {
            state,
            fetcher,
            base_host: Arc::from(base_host.to_ascii_lowercase()),
        }
    }

    /// Returns the shared crawl state
    pub fn state(&self) -> &Arc<CrawlState> {
        &self.state
    }

    /// Registers one unit of work for `url` and spawns a worker for it
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, url: String) {
        let guard = self.state.register_work();
        let worker = self.clone();
        tokio::spawn(async move {
            // Released when the task ends, including on panic
            let _guard = guard;
            let outcome = worker.visit(&url).await;
            tracing::trace!("Visit of {} ended: {:?}", url, outcome);
        });
    }

    /// Processes one candidate URL end-to-end
    ///
    /// Children are spawned through [`Scheduler::schedule`]; the caller is
    /// responsible for the completion accounting of this visit itself.
    pub async fn visit(&self, raw_url: &str) -> VisitOutcome {
        let _slot = self.state.acquire_slot().await;

        if self.state.is_over_capacity() {
            tracing::trace!("Page limit reached, dropping {}", raw_url);
            return VisitOutcome::OverCapacity;
        }

        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping unparseable URL {}: {}", raw_url, e);
                return VisitOutcome::InvalidUrl;
            }
        };

        if !same_host(&url, &self.base_host) {
            return VisitOutcome::OffHost;
        }

        let key = normalize_url(raw_url);
        if !self.state.try_claim(&key) {
            return VisitOutcome::AlreadyClaimed;
        }

        tracing::debug!("Fetching {}", raw_url);
        let body = match self.fetcher.fetch(raw_url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", raw_url, e);
                self.state.mark_failed(&key, e.to_string());
                return VisitOutcome::FetchFailed;
            }
        };

        let page = extract_page_data(&body, raw_url);
        let links = page.outgoing_links.clone();
        self.state.record(&key, page);
        self.report_progress();

        for link in &links {
            self.schedule(link.clone());
        }

        VisitOutcome::Processed {
            children: links.len(),
        }
    }

    fn report_progress(&self) {
        let processed = self.state.processed_count();
        if processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages processed, {} claimed of {} allowed, {} tasks outstanding",
                processed,
                self.state.len(),
                self.state.max_pages(),
                self.state.outstanding_work()
            );
        }
    }
}
