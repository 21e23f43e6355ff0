//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML extraction into [`PageRecord`]s
//! - Recursive task scheduling with bounded admission
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, CrawlSettings};
pub use fetcher::{build_http_client, fetch_url, FetchError, Fetcher, HttpFetcher};
pub use parser::{
    extract_page_data, get_first_paragraph_from_html, get_h1_from_html, get_images_from_html,
    get_urls_from_html, PageRecord,
};
pub use scheduler::{Scheduler, VisitOutcome};
