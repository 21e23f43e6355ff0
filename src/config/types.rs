use serde::Deserialize;

/// Main configuration structure for Linkloom
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; its host is the only host that will be crawled
    #[serde(rename = "base-url", default)]
    pub base_url: String,

    /// Maximum number of concurrent fetch+extract operations
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Page-count ceiling for the whole crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV report written after the crawl
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            max_concurrency: default_max_concurrency(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

fn default_max_concurrency() -> u32 {
    4
}

fn default_max_pages() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    10
}

fn default_crawler_name() -> String {
    "linkloom".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_report_path() -> String {
    "report.csv".to_string()
}
