use crate::crawlers::crawler::{self, CrawlRequest, PageFetcher, TextExtractor, Visit};
use crate::error::CrawlError;
use crate::frontier::Frontier;
use crate::results::CrawlResult;

/// Breadth-first crawl, one page at a time.
///
/// Visitation order is strict BFS from the seed. Per-page failures are
/// recorded in `skipped`; only an invalid request returns `Err`. When the
/// request carries a timeout, whatever was gathered before the deadline is
/// returned with `timed_out` set.
pub async fn crawl<F, E>(
    request: &CrawlRequest,
    fetcher: &F,
    extractor: &E,
) -> Result<CrawlResult, CrawlError>
where
    F: PageFetcher + ?Sized,
    E: TextExtractor + ?Sized,
{
    request.validate()?;

    let scope = request.scope();
    let deadline = request.deadline();
    ::log::info!(
        "Starting crawl of {} (scope {}, up to {} pages)",
        request.seed(),
        scope.prefix(),
        request.max_pages()
    );

    let mut frontier = Frontier::seeded(request.seed().clone());
    let mut result = CrawlResult::default();

    while result.pages.len() < request.max_pages() {
        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
            ::log::info!("Deadline reached, stopping crawl");
            result.timed_out = true;
            break;
        }

        let Some(url) = frontier.pop() else {
            break;
        };

        // Claimed before the fetch so nothing can queue it again
        if !result.visited.insert(url.to_string()) {
            ::log::trace!("Skipping already visited: {}", url);
            continue;
        }

        let visit = match deadline {
            Some(d) => match tokio::time::timeout_at(d, crawler::visit(fetcher, extractor, &scope, &url)).await {
                Ok(visit) => visit,
                Err(_) => {
                    ::log::warn!("Deadline reached while fetching {}", url);
                    result.timed_out = true;
                    break;
                }
            },
            None => crawler::visit(fetcher, extractor, &scope, &url).await,
        };

        match visit {
            Visit::Page { page, base, links } => {
                // The redirect target counts as seen so a link to it is not fetched again
                result.visited.insert(base.to_string());
                crawler::enqueue_links(&base, &links, request, &scope, &result.visited, &mut frontier);
                ::log::info!("Crawled [{}/{}]: {}", result.pages.len() + 1, request.max_pages(), url);
                result.pages.push(page);
            }
            Visit::Skipped(skipped) => {
                ::log::warn!("Skipping {}: {}", skipped.url, skipped.reason);
                result.skipped.push(skipped);
            }
        }
    }

    result.unattempted = frontier.len();
    ::log::info!(
        "Crawl complete - {} pages, {} skipped, {} unattempted",
        result.pages.len(),
        result.skipped_count(),
        result.unattempted
    );

    Ok(result)
}
