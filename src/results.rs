use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One successfully fetched and extracted page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized URL of the page
    pub url: String,

    /// Title of the page (if available)
    pub title: Option<String>,

    /// Extracted text content
    pub text: String,

    /// When the page body was received
    pub fetched_at: DateTime<Utc>,
}

/// A URL that was attempted but produced no page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPage {
    pub url: String,
    pub reason: String,
}

/// Snapshot of one crawl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Pages in visitation order (completion order for concurrent crawls)
    pub pages: Vec<PageRecord>,

    /// Every URL that was claimed for a fetch
    pub visited: HashSet<String>,

    /// URLs that failed to fetch or extract
    pub skipped: Vec<SkippedPage>,

    /// In-scope URLs still queued when the crawl stopped
    pub unattempted: usize,

    /// Whether the deadline ended the crawl
    pub timed_out: bool,
}

impl CrawlResult {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.url.as_str())
    }

    /// Concatenates every page into one document, in page order.
    ///
    /// Each page is introduced by its title (or URL) and source URL. No
    /// truncation happens here.
    pub fn to_document(&self) -> String {
        let mut document = String::new();

        for page in &self.pages {
            if !document.is_empty() {
                document.push_str("\n\n");
            }
            let heading = page.title.as_deref().unwrap_or(&page.url);
            document.push_str(&format!("# {}\nSource: {}\n\n{}", heading, page.url, page.text));
        }

        document
    }
}
