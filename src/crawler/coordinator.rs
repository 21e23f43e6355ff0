//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl from start to finish:
//! - Creating the shared state and the scheduler
//! - Seeding the root task with the base URL
//! - Waiting for the completion barrier
//! - Draining the visited map into a [`CrawlOutcome`]
//! - Writing the CSV report

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::PageRecord;
use crate::crawler::scheduler::Scheduler;
use crate::output::{write_csv_report, CrawlStatistics};
use crate::state::{CrawlState, PageState};
use crate::url::extract_domain;
use crate::{ConfigError, LinkloomError};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Parameters of a single crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Seed URL; its host is the only host crawled
    pub base_url: String,

    /// Capacity of the admission gate
    pub max_concurrency: usize,

    /// Page-count ceiling
    pub max_pages: usize,
}

impl CrawlSettings {
    /// Takes the crawl parameters from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            max_concurrency: config.max_concurrency as usize,
            max_pages: config.max_pages as usize,
        }
    }
}

/// Result of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Processed pages keyed by normalized URL
    pub pages: BTreeMap<String, PageRecord>,

    /// Failed pages and the reason, keyed by normalized URL
    pub failures: BTreeMap<String, String>,

    /// Summary of the crawl
    pub statistics: CrawlStatistics,
}

impl CrawlOutcome {
    fn from_pages(
        pages: HashMap<String, PageState>,
        started_at: chrono::DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let mut processed = BTreeMap::new();
        let mut failures = BTreeMap::new();
        let mut abandoned = 0;

        for (key, state) in pages {
            match state {
                PageState::Processed(record) => {
                    processed.insert(key, record);
                }
                PageState::Failed { reason } => {
                    failures.insert(key, reason);
                }
                PageState::Claimed => {
                    tracing::warn!("Page {} was claimed but never finished", key);
                    abandoned += 1;
                }
            }
        }

        let statistics =
            CrawlStatistics::collect(&processed, failures.len(), abandoned, started_at, elapsed);

        Self {
            pages: processed,
            failures,
            statistics,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher = HttpFetcher> {
    settings: CrawlSettings,
    base_host: String,
    fetcher: Arc<F>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(LinkloomError)` - The base URL is unusable or the HTTP client failed to build
    pub fn new(config: &Config) -> Result<Self, LinkloomError> {
        let fetcher = HttpFetcher::from_config(&config.crawler, &config.user_agent)?;
        Self::with_fetcher(CrawlSettings::from_config(&config.crawler), fetcher)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator around any page source
    pub fn with_fetcher(settings: CrawlSettings, fetcher: F) -> Result<Self, LinkloomError> {
        let base = Url::parse(&settings.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", settings.base_url, e))
        })?;
        let base_host = extract_domain(&base).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Base URL '{}' has no host", settings.base_url))
        })?;

        Ok(Self {
            settings,
            base_host,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Host every crawled page must share
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Runs the crawl to completion
    ///
    /// Returns once every spawned task has finished. Per-page failures never
    /// abort the crawl; they are reported in the outcome.
    pub async fn run(self) -> CrawlOutcome {
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} concurrent)",
            self.settings.base_url,
            self.settings.max_pages,
            self.settings.max_concurrency
        );

        let state = Arc::new(CrawlState::new(
            self.settings.max_pages,
            self.settings.max_concurrency,
        ));
        let scheduler = Scheduler::new(Arc::clone(&state), self.fetcher, &self.base_host);

        scheduler.schedule(self.settings.base_url.clone());
        state.wait_for_completion().await;

        let outcome = CrawlOutcome::from_pages(state.take_pages(), started_at, start_time.elapsed());

        tracing::info!(
            "Crawl completed: {} pages processed, {} failed in {:?}",
            outcome.statistics.pages_processed,
            outcome.statistics.pages_failed,
            outcome.statistics.elapsed
        );

        outcome
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the HTTP fetcher from the configuration
/// 2. Crawl the base URL's host until the frontier is exhausted or the page
///    limit is reached
/// 3. Write the CSV report to the configured path
///
/// A crawl whose seed fails still succeeds, with a header-only report.
///
/// # Example
///
/// ```no_run
/// use linkloom::config::load_config;
/// use linkloom::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("{} pages", outcome.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome, LinkloomError> {
    let coordinator = Coordinator::new(&config)?;
    let outcome = coordinator.run().await;

    let report_path = Path::new(&config.output.report_path);
    write_csv_report(&outcome.pages, report_path)?;
    tracing::info!(
        "Wrote report for {} pages to {}",
        outcome.pages.len(),
        report_path.display()
    );

    Ok(outcome)
}
