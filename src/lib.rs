pub mod config;
pub mod crawlers;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod frontier;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use crawlers::{CrawlRequest, Extracted, FetchedPage, PageFetcher, TextExtractor};
pub use error::{ConfigError, CrawlError, FetchError, ParseError};
pub use filter::OriginPolicy;
pub use results::{CrawlResult, PageRecord, SkippedPage};

use config::{CrawlConfig, FetcherConfig};
use fetchers::{HttpFetcher, WebDriverFetcher};
use filter::UrlFilter;
use parsers::ContentExtractor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Crawls `seed` with the stock HTTP fetcher and content extractor
pub async fn crawl_site(
    seed: &str,
    max_pages: usize,
    timeout_ms: Option<u64>,
) -> Result<CrawlResult, CrawlError> {
    SiteCrawler::new(seed)
        .with_max_pages(max_pages)
        .with_timeout_ms(timeout_ms)
        .run()
        .await
}

/// Builder for a single site crawl
#[derive(Debug, Clone)]
pub struct SiteCrawler {
    config: CrawlConfig,
}

impl SiteCrawler {
    pub fn new(seed: &str) -> Self {
        Self {
            config: CrawlConfig::new(seed),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, CrawlError> {
        let config = CrawlConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.config.origin_policy = policy;
        self
    }

    pub fn with_fetcher(mut self, fetcher: FetcherConfig) -> Self {
        self.config.fetcher = fetcher;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Validates the configuration into a request without touching the network
    pub fn request(&self) -> Result<CrawlRequest, CrawlError> {
        let url_filter = UrlFilter::new(&self.config.url_filter_config())?;
        let request = CrawlRequest::new(&self.config.seed_url, self.config.max_pages)?
            .with_origin_policy(self.config.origin_policy)
            .with_url_filter(url_filter)
            .with_timeout(self.config.timeout_ms.map(Duration::from_millis))
            .with_max_concurrency(self.config.max_concurrency);
        request.validate()?;
        Ok(request)
    }

    /// Crawls with the configured stock fetcher and [`ContentExtractor`]
    pub async fn run(mut self) -> Result<CrawlResult, CrawlError> {
        self.config.apply_env();
        let request = self.request()?;
        let extractor = Arc::new(ContentExtractor::default());

        match &self.config.fetcher {
            FetcherConfig::Http(cfg) => {
                let fetcher = HttpFetcher::with_settings(
                    &cfg.user_agent,
                    Duration::from_secs(cfg.request_timeout_secs),
                )?;
                dispatch(&request, Arc::new(fetcher), extractor).await
            }
            FetcherConfig::WebDriver(cfg) => {
                let fetcher = Arc::new(WebDriverFetcher::new(cfg.webdriver_url.clone()));
                let result = dispatch(&request, Arc::clone(&fetcher), extractor).await;
                fetcher.close().await;
                result
            }
        }
    }

    /// Crawls with caller-supplied collaborators
    pub async fn run_with<F, E>(self, fetcher: Arc<F>, extractor: Arc<E>) -> Result<CrawlResult, CrawlError>
    where
        F: PageFetcher + ?Sized + 'static,
        E: TextExtractor + ?Sized + 'static,
    {
        let request = self.request()?;
        dispatch(&request, fetcher, extractor).await
    }
}

async fn dispatch<F, E>(
    request: &CrawlRequest,
    fetcher: Arc<F>,
    extractor: Arc<E>,
) -> Result<CrawlResult, CrawlError>
where
    F: PageFetcher + ?Sized + 'static,
    E: TextExtractor + ?Sized + 'static,
{
    if request.max_concurrency() > 1 {
        crawlers::crawl_concurrent(request, fetcher, extractor).await
    } else {
        crawlers::crawl(request, fetcher.as_ref(), extractor.as_ref()).await
    }
}
