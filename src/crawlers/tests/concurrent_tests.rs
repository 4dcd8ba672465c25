use super::{MockSite, StatusFetcher};
use crate::crawlers::crawl_concurrent;
use crate::crawlers::crawler::CrawlRequest;
use crate::parsers::html::HtmlExtractor;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn request(seed: &str, max_pages: usize, workers: usize) -> CrawlRequest {
    CrawlRequest::new(seed, max_pages)
        .unwrap()
        .with_max_concurrency(workers)
}

#[tokio::test]
async fn test_scope_and_dedup_hold_with_workers() {
    let site = Arc::new(
        MockSite::new()
            .page(
                "https://example.org/a",
                &["/b", "/c", "https://other.org/x", "/b#dup"],
            )
            .page("https://example.org/b", &["/a", "/c"])
            .page("https://example.org/c", &["/b", "/a#top"])
            .page("https://other.org/x", &[]),
    );

    let result = crawl_concurrent(
        &request("https://example.org/a", 10, 4),
        Arc::clone(&site),
        Arc::new(HtmlExtractor),
    )
    .await
    .unwrap();

    let urls: HashSet<_> = result.urls().collect();
    let expected: HashSet<_> = [
        "https://example.org/a",
        "https://example.org/b",
        "https://example.org/c",
    ]
    .into_iter()
    .collect();
    assert_eq!(urls, expected);
    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.pages[0].url, "https://example.org/a");
    site.assert_no_refetch();
}

#[tokio::test]
async fn test_budget_holds_with_workers() {
    let site = Arc::new(MockSite::new().endless().with_delay(Duration::from_millis(5)));

    let result = crawl_concurrent(
        &request("https://example.org/", 12, 8),
        Arc::clone(&site),
        Arc::new(HtmlExtractor),
    )
    .await
    .unwrap();

    assert_eq!(result.pages.len(), 12);
    let distinct: HashSet<_> = result.urls().collect();
    assert_eq!(distinct.len(), 12);
    // Never claims more than the budget can absorb
    assert_eq!(site.fetched().len(), 12);
    assert!(result.unattempted > 0);
    site.assert_no_refetch();
}

#[tokio::test]
async fn test_server_errors_with_workers() {
    let result = crawl_concurrent(
        &request("https://example.org/a", 5, 4),
        Arc::new(StatusFetcher(500)),
        Arc::new(HtmlExtractor),
    )
    .await
    .unwrap();

    assert!(result.pages.is_empty());
    assert_eq!(result.skipped_count(), 1);
    assert_eq!(result.unattempted, 0);
}

#[tokio::test]
async fn test_failures_free_budget_for_other_pages() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.org/", &["/bad1", "/bad2", "/ok1", "/ok2"])
            .status("https://example.org/bad1", 404)
            .unreachable("https://example.org/bad2")
            .page("https://example.org/ok1", &[])
            .page("https://example.org/ok2", &[]),
    );

    let result = crawl_concurrent(
        &request("https://example.org/", 3, 2),
        Arc::clone(&site),
        Arc::new(HtmlExtractor),
    )
    .await
    .unwrap();

    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.skipped_count(), 2);
    assert_eq!(result.unattempted, 0);
}

#[tokio::test]
async fn test_single_worker_matches_bfs_order() {
    let site = Arc::new(
        MockSite::new()
            .page("https://example.org/a", &["/b", "/c"])
            .page("https://example.org/b", &["/d"])
            .page("https://example.org/c", &[])
            .page("https://example.org/d", &[]),
    );

    let result = crawl_concurrent(
        &request("https://example.org/a", 10, 1),
        site,
        Arc::new(HtmlExtractor),
    )
    .await
    .unwrap();

    let urls: Vec<_> = result.urls().collect();
    assert_eq!(
        urls,
        vec![
            "https://example.org/a",
            "https://example.org/b",
            "https://example.org/c",
            "https://example.org/d",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_workers() {
    let site = Arc::new(MockSite::new().endless().with_delay(Duration::from_millis(100)));
    let request = request("https://example.org/", 100, 3).with_timeout(Some(Duration::from_millis(250)));

    let result = crawl_concurrent(&request, site, Arc::new(HtmlExtractor))
        .await
        .unwrap();

    assert!(result.timed_out);
    assert!(!result.pages.is_empty());
    assert!(result.pages.len() < 100);
}

#[tokio::test]
async fn test_invalid_concurrency_is_rejected() {
    let request = CrawlRequest::new("https://example.org/", 5)
        .unwrap()
        .with_max_concurrency(0);
    let result = crawl_concurrent(&request, Arc::new(StatusFetcher(200)), Arc::new(HtmlExtractor)).await;
    assert!(result.is_err());
}
