use crate::crawlers::crawler::DEFAULT_MAX_PAGES;
use crate::error::ConfigError;
use crate::fetchers::http::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::fetchers::webdriver::DEFAULT_WEBDRIVER_URL;
use crate::filter::{OriginPolicy, UrlFilterConfig, default_exclude_patterns};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one site crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    pub seed_url: String,

    /// Upper bound on pages in the result
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Fetches in flight at once; 1 keeps strict BFS order
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Overall crawl budget; partial results are returned when it runs out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub origin_policy: OriginPolicy,

    /// Regex patterns for URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// Which page fetcher to crawl with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FetcherConfig {
    /// Plain HTTP GET
    Http(HttpFetcherConfig),

    /// Headless browser over WebDriver, for JavaScript-rendered sites
    WebDriver(WebDriverFetcherConfig),
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig::Http(HttpFetcherConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpFetcherConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebDriverFetcherConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Default for WebDriverFetcherConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
        }
    }
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_concurrency() -> usize {
    1
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            max_pages: default_max_pages(),
            max_concurrency: default_max_concurrency(),
            timeout_ms: None,
            origin_policy: OriginPolicy::default(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
            fetcher: FetcherConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.apply_env();
        Ok(config)
    }

    /// `WEBDRIVER_URL` wins over the configured WebDriver address
    pub fn apply_env(&mut self) {
        self.override_webdriver_url(std::env::var("WEBDRIVER_URL").ok());
    }

    fn override_webdriver_url(&mut self, webdriver_url: Option<String>) {
        if let FetcherConfig::WebDriver(cfg) = &mut self.fetcher {
            if let Some(webdriver_url) = webdriver_url.filter(|url| !url.is_empty()) {
                cfg.webdriver_url = webdriver_url;
            }
        }
    }

    pub fn url_filter_config(&self) -> UrlFilterConfig {
        UrlFilterConfig {
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}
