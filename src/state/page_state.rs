//! Page state definitions for tracking crawl progress
//!
//! Every normalized URL key in the visited map holds one of these states.

use crate::crawler::PageRecord;
use std::fmt;

/// Represents the state of a page key in the visited map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    // ===== Active State =====
    /// Key has been claimed by a worker that is fetching it
    Claimed,

    // ===== Terminal States =====
    /// Page was fetched and extracted
    Processed(PageRecord),

    /// Fetch failed after the key was claimed
    Failed {
        /// Why the fetch failed
        reason: String,
    },
}

impl PageState {
    /// Returns true if the page will not change state again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Claimed)
    }

    /// Returns true if the page was successfully processed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed(_))
    }

    /// Returns the record of a processed page
    pub fn record(&self) -> Option<&PageRecord> {
        match self {
            Self::Processed(record) => Some(record),
            _ => None,
        }
    }

    /// Returns a short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Processed(_) => "processed",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}
