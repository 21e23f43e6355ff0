//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Status and Content-Type gating
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::same_host;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Reasons a page could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Redirect from {url} leaves the host (to '{location}')")]
    OffHostRedirect { url: String, location: String },

    #[error("Expected HTML from {url}, got '{content_type}'")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of page bodies for the crawl
///
/// Implementations must be shareable across worker tasks. Every error is
/// treated as a local failure of the page being fetched.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches the HTML body of `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use linkloom::config::UserAgentConfig;
/// use linkloom::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(same_host_redirects())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Redirect policy following at most [`MAX_REDIRECTS`] hops on the original host
///
/// A hop to another host is not followed; the 3xx response itself is returned
/// and rejected by [`fetch_url`].
fn same_host_redirects() -> Policy {
    Policy::custom(|attempt| {
        let origin_host = attempt
            .previous()
            .first()
            .and_then(|origin| origin.host_str())
            .map(str::to_string);

        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if origin_host.map_or(false, |host| same_host(attempt.url(), &host)) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(crawler.request_timeout_secs);
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and returns its HTML body
///
/// # Error Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | URL does not parse | InvalidUrl |
/// | Request timed out | Timeout |
/// | Connection/TLS/redirect failure | Transport |
/// | Redirect to another host | OffHostRedirect |
/// | HTTP status >= 400 | HttpStatus |
/// | Content-Type not `text/html...` | ContentMismatch |
/// | Body could not be read | Body |
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| classify_request_error(url, e))?;

    let status = response.status();
    if status.is_redirection() {
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        return Err(FetchError::OffHostRedirect {
            url: url.to_string(),
            location,
        });
    }

    if status.as_u16() >= 400 {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.starts_with("text/html") {
        return Err(FetchError::ContentMismatch {
            url: url.to_string(),
            content_type,
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })
}

fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
