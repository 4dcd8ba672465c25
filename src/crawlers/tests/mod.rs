//! In-memory site used by the crawl tests

mod concurrent_tests;

use crate::crawlers::crawler::{FetchedPage, PageFetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

enum MockPage {
    Html(Vec<String>),
    Status(u16),
    Unreachable,
    Garbled,
}

/// Serves canned pages by URL. Unknown URLs are 404 unless the site is
/// endless, in which case every path links to three deeper children.
pub(crate) struct MockSite {
    pages: HashMap<String, MockPage>,
    endless: bool,
    delay: Option<Duration>,
    fetched: Mutex<Vec<String>>,
}

impl MockSite {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
            endless: false,
            delay: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn page(mut self, url: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|l| l.to_string()).collect();
        self.pages.insert(url.to_string(), MockPage::Html(links));
        self
    }

    pub(crate) fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), MockPage::Status(status));
        self
    }

    pub(crate) fn unreachable(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), MockPage::Unreachable);
        self
    }

    pub(crate) fn garbled(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), MockPage::Garbled);
        self
    }

    pub(crate) fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every URL fetched so far, in call order
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn assert_no_refetch(&self) {
        let fetched = self.fetched();
        let unique: HashSet<_> = fetched.iter().collect();
        assert_eq!(unique.len(), fetched.len(), "a URL was fetched twice: {:?}", fetched);
    }
}

fn render(url: &Url, links: &[String]) -> Vec<u8> {
    let anchors: String = links
        .iter()
        .map(|l| format!("<a href=\"{}\">link</a>", l))
        .collect();
    format!(
        "<html><head><title>{path}</title></head><body><p>Content of {path}</p>{anchors}</body></html>",
        path = url.path(),
        anchors = anchors
    )
    .into_bytes()
}

#[async_trait]
impl PageFetcher for MockSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(url.as_str()) {
            Some(MockPage::Html(links)) => Ok(FetchedPage::new(200, render(url, links))),
            Some(MockPage::Status(status)) => Ok(FetchedPage::new(*status, "")),
            Some(MockPage::Unreachable) => Err(FetchError::new("connection refused")),
            Some(MockPage::Garbled) => Ok(FetchedPage::new(200, vec![0xff, 0xfe, 0xfd])),
            None if self.endless => {
                let base = url.path().trim_end_matches('/');
                let children: Vec<String> = (0..3).map(|i| format!("{}/{}", base, i)).collect();
                Ok(FetchedPage::new(200, render(url, &children)))
            }
            None => Ok(FetchedPage::new(404, "")),
        }
    }
}

/// A fetcher that fails every request with the same status
pub(crate) struct StatusFetcher(pub u16);

#[async_trait]
impl PageFetcher for StatusFetcher {
    async fn fetch(&self, _url: &Url) -> Result<FetchedPage, FetchError> {
        Ok(FetchedPage::new(self.0, "Internal Server Error"))
    }
}
