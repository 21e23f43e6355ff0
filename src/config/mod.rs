//! Configuration module for Linkloom
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command-line arguments can be layered on top of a file (or of the defaults)
//! before [`validate`] runs.
//!
//! # Example
//!
//! ```no_run
//! use linkloom::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkloom.toml")).unwrap();
//! println!("Crawling {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, read_config};
pub use validation::validate;
