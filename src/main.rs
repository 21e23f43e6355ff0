//! Linkloom main entry point
//!
//! This is the command-line interface for the Linkloom site cartographer.

use anyhow::Context;
use clap::Parser;
use linkloom::config::{compute_config_hash, read_config, validate, Config};
use linkloom::crawler::run_crawl;
use linkloom::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkloom: a single-host site cartographer
///
/// Linkloom crawls every page reachable from BASE_URL on the same host,
/// up to MAX_PAGES pages with at most MAX_CONCURRENCY fetches in flight,
/// and writes the first heading, first paragraph, links and images of each
/// page to a CSV report.
#[derive(Parser, Debug)]
#[command(name = "linkloom")]
#[command(version)]
#[command(about = "A single-host site cartographer", long_about = None)]
struct Cli {
    /// Seed URL; only pages on its host are crawled
    #[arg(value_name = "BASE_URL")]
    base_url: Option<String>,

    /// Maximum number of pages fetched concurrently
    #[arg(value_name = "MAX_CONCURRENCY")]
    max_concurrency: Option<u32>,

    /// Maximum number of pages to crawl
    #[arg(value_name = "MAX_PAGES")]
    max_pages: Option<u32>,

    /// Path to TOML configuration file; positional arguments override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path of the CSV report
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkloom=info,warn"),
            1 => EnvFilter::new("linkloom=debug,info"),
            2 => EnvFilter::new("linkloom=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers command-line arguments over the config file (or the defaults) and validates the result
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = base_url.clone();
    }
    if let Some(max_concurrency) = cli.max_concurrency {
        config.crawler.max_concurrency = max_concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(output) = &cli.output {
        config.output.report_path = output.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Linkloom Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max concurrency: {}", config.crawler.max_concurrency);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    let report_path = config.output.report_path.clone();

    let outcome = match run_crawl(config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_statistics(&outcome.statistics, &outcome.failures);
        println!("\nReport written to: {}", report_path);
    }

    Ok(())
}
