//! URL handling module for Linkloom
//!
//! This module provides the dedup-key normalizer and host helpers used to keep
//! the crawl on a single host.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::normalize_url;
