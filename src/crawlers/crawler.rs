use crate::error::{CrawlError, FetchError, ParseError};
use crate::filter::{self, OriginPolicy, Scope, UrlFilter};
use crate::frontier::Frontier;
use crate::results::{PageRecord, SkippedPage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 10;

/// Raw response for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: Vec<u8>,
    /// Where the response actually came from, when redirects were followed
    pub final_url: Option<Url>,
}

impl FetchedPage {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            final_url: None,
        }
    }

    pub fn with_final_url(mut self, url: Url) -> Self {
        self.final_url = Some(url);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What an extractor pulled out of a page body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub text: String,
    /// Outgoing links as found in the page; may be relative
    pub links: Vec<String>,
}

/// Fetches one URL. Non-2xx responses should be returned, not turned into errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Turns a page body into title, text and links
pub trait TextExtractor: Send + Sync {
    fn extract(&self, body: &[u8]) -> Result<Extracted, ParseError>;
}

/// Parameters of a single crawl
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    seed: Url,
    max_pages: usize,
    origin_policy: OriginPolicy,
    url_filter: UrlFilter,
    timeout: Option<Duration>,
    max_concurrency: usize,
}

impl CrawlRequest {
    /// Validates the seed and page budget; nothing touches the network here
    pub fn new(seed: &str, max_pages: usize) -> Result<Self, CrawlError> {
        let seed = parse_seed(seed)?;
        let request = Self {
            seed,
            max_pages,
            origin_policy: OriginPolicy::default(),
            url_filter: UrlFilter::default(),
            timeout: None,
            max_concurrency: 1,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_origin_policy(mut self, policy: OriginPolicy) -> Self {
        self.origin_policy = policy;
        self
    }

    pub fn with_url_filter(mut self, filter: UrlFilter) -> Self {
        self.url_filter = filter;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn origin_policy(&self) -> OriginPolicy {
        self.origin_policy
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn scope(&self) -> Scope {
        Scope::new(&self.seed, self.origin_policy)
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_pages == 0 {
            return Err(CrawlError::InvalidInput(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(CrawlError::InvalidInput(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn deadline(&self) -> Option<tokio::time::Instant> {
        self.timeout.map(|t| tokio::time::Instant::now() + t)
    }

    pub(crate) fn url_filter(&self) -> &UrlFilter {
        &self.url_filter
    }
}

fn parse_seed(seed: &str) -> Result<Url, CrawlError> {
    let url = filter::normalize_str(seed.trim())
        .map_err(|e| CrawlError::InvalidInput(format!("invalid seed URL '{}': {}", seed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::InvalidInput(format!(
            "seed URL must be http or https: {}",
            seed
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(CrawlError::InvalidInput(format!(
            "seed URL has no host: {}",
            seed
        )));
    }

    Ok(url)
}

/// Outcome of fetching and extracting one URL
pub(crate) enum Visit {
    /// `base` is the URL the content was served from; links resolve against it
    Page {
        page: PageRecord,
        base: Url,
        links: Vec<String>,
    },
    Skipped(SkippedPage),
}

/// Single attempt at one URL; every failure becomes a skip
pub(crate) async fn visit<F, E>(fetcher: &F, extractor: &E, scope: &Scope, url: &Url) -> Visit
where
    F: PageFetcher + ?Sized,
    E: TextExtractor + ?Sized,
{
    let started = std::time::Instant::now();
    let skipped = |reason: String| {
        Visit::Skipped(SkippedPage {
            url: url.to_string(),
            reason,
        })
    };

    let fetched = match fetcher.fetch(url).await {
        Ok(fetched) => fetched,
        Err(e) => return skipped(e.to_string()),
    };
    if !fetched.is_success() {
        return skipped(format!("HTTP {}", fetched.status));
    }

    let base = match fetched.final_url.as_ref().map(filter::normalize_url) {
        Some(final_url) if final_url != *url => {
            if !scope.contains(&final_url) {
                return skipped(format!("redirected out of scope to {}", final_url));
            }
            ::log::debug!("{} redirected to {}", url, final_url);
            final_url
        }
        _ => url.clone(),
    };
    let fetched_at = Utc::now();

    let extracted = match extractor.extract(&fetched.body) {
        Ok(extracted) => extracted,
        Err(e) => return skipped(e.to_string()),
    };

    ::log::debug!(
        "Visited {} ({} bytes, {} links) in {:.2} seconds",
        url,
        fetched.body.len(),
        extracted.links.len(),
        started.elapsed().as_secs_f64()
    );

    let page = PageRecord {
        url: url.to_string(),
        title: extracted.title,
        text: extracted.text,
        fetched_at,
    };
    Visit::Page {
        page,
        base,
        links: extracted.links,
    }
}

/// Resolves a page's links and queues the in-scope, unseen ones
pub(crate) fn enqueue_links(
    page_url: &Url,
    links: &[String],
    request: &CrawlRequest,
    scope: &Scope,
    visited: &HashSet<String>,
    frontier: &mut Frontier,
) -> usize {
    let mut queued = 0;

    for href in links {
        let Some(link) = filter::resolve_link(page_url, href) else {
            continue;
        };
        if !scope.contains(&link) {
            ::log::debug!("Out of scope: {}", link);
            continue;
        }
        if !request.url_filter().allows(&link) {
            ::log::debug!("URL filter rejected: {}", link);
            continue;
        }
        if visited.contains(link.as_str()) || frontier.contains(&link) {
            ::log::trace!("Skipping already visited or queued link: {}", link);
            continue;
        }

        ::log::debug!("Queuing link for crawling: {}", link);
        frontier.push(link);
        queued += 1;
    }

    queued
}
