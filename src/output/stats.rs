//! Statistics generation from a finished crawl
//!
//! This module provides functionality for summarizing a crawl outcome and
//! displaying the summary on stdout.

use crate::crawler::PageRecord;
use crate::url::normalize_url;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// Pages fetched and extracted
    pub pages_processed: usize,

    /// Pages claimed whose fetch failed
    pub pages_failed: usize,

    /// Pages claimed but never finished (their worker died)
    pub pages_abandoned: usize,

    /// Outgoing links across all processed pages
    pub total_links: usize,

    /// Distinct normalized link targets
    pub unique_link_targets: usize,

    /// Image references across all processed pages
    pub total_images: usize,
}

impl CrawlStatistics {
    /// Computes statistics from the processed pages of a crawl
    ///
    /// # Arguments
    ///
    /// * `pages` - Processed pages keyed by normalized URL
    /// * `pages_failed` - Number of keys that ended in a failed state
    /// * `pages_abandoned` - Number of keys still holding a placeholder
    /// * `started_at` - Crawl start time
    /// * `elapsed` - Crawl duration
    pub fn collect(
        pages: &BTreeMap<String, PageRecord>,
        pages_failed: usize,
        pages_abandoned: usize,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let mut targets = HashSet::new();
        let mut total_links = 0;
        let mut total_images = 0;

        for page in pages.values() {
            total_links += page.outgoing_links.len();
            total_images += page.image_urls.len();
            targets.extend(page.outgoing_links.iter().map(|link| normalize_url(link)));
        }

        Self {
            started_at,
            elapsed,
            pages_processed: pages.len(),
            pages_failed,
            pages_abandoned,
            total_links,
            unique_link_targets: targets.len(),
            total_images,
        }
    }

    /// Total keys claimed during the crawl
    pub fn pages_claimed(&self) -> usize {
        self.pages_processed + self.pages_failed + self.pages_abandoned
    }

    /// Percentage of claimed pages that were processed
    pub fn success_rate(&self) -> f64 {
        let claimed = self.pages_claimed();
        if claimed == 0 {
            return 0.0;
        }
        (self.pages_processed as f64 / claimed as f64) * 100.0
    }

    /// Processed pages per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `failures` - Failed pages and their reasons, keyed by normalized URL
pub fn print_statistics(stats: &CrawlStatistics, failures: &BTreeMap<String, String>) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!(
        "  Started: {}",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Duration: {:.2}s ({:.2} pages/sec)",
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second()
    );
    println!("  Pages processed: {}", stats.pages_processed);
    println!("  Pages failed: {}", stats.pages_failed);
    if stats.pages_abandoned > 0 {
        println!("  Pages abandoned: {}", stats.pages_abandoned);
    }
    println!(
        "  Links found: {} ({} distinct targets)",
        stats.total_links, stats.unique_link_targets
    );
    println!("  Images found: {}", stats.total_images);
    println!();

    if !failures.is_empty() {
        println!("Failed Pages ({}):", failures.len());
        for (key, reason) in failures {
            println!("  - {}: {}", key, reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.pages_processed,
        stats.pages_claimed()
    );
}
