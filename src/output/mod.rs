//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing the CSV report of processed pages
//! - Computing and printing crawl statistics

mod csv_report;
pub mod stats;

pub use csv_report::{write_csv, write_csv_report, LIST_SEPARATOR, REPORT_HEADER};
pub use stats::{print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors raised while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
