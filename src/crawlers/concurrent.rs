use crate::crawlers::crawler::{self, CrawlRequest, PageFetcher, TextExtractor, Visit};
use crate::error::CrawlError;
use crate::filter::Scope;
use crate::frontier::Frontier;
use crate::results::CrawlResult;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

/// Everything the workers share. All of it lives behind one lock, so
/// claiming a URL and merging discovered links are a single critical section.
#[derive(Default)]
struct CrawlState {
    frontier: Frontier,
    result: CrawlResult,
    in_flight: usize,
    finished: bool,
}

struct Shared<F: ?Sized, E: ?Sized> {
    request: CrawlRequest,
    scope: Scope,
    deadline: Option<Instant>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    state: Mutex<CrawlState>,
    wake: Notify,
}

enum Next {
    Visit(Url),
    Wait,
    Stop,
}

/// Breadth-first crawl with up to `max_concurrency` fetches in flight.
///
/// The page budget, de-duplication and scope rules are the same as
/// [`crate::crawlers::bfs::crawl`]. Pages are ordered by completion, which
/// is close to but not guaranteed to be BFS order.
pub async fn crawl_concurrent<F, E>(
    request: &CrawlRequest,
    fetcher: Arc<F>,
    extractor: Arc<E>,
) -> Result<CrawlResult, CrawlError>
where
    F: PageFetcher + ?Sized + 'static,
    E: TextExtractor + ?Sized + 'static,
{
    request.validate()?;

    let num_workers = request.max_concurrency();
    ::log::info!(
        "Starting crawl of {} with {} workers (up to {} pages)",
        request.seed(),
        num_workers,
        request.max_pages()
    );

    let shared = Arc::new(Shared {
        request: request.clone(),
        scope: request.scope(),
        deadline: request.deadline(),
        fetcher,
        extractor,
        state: Mutex::new(CrawlState {
            frontier: Frontier::seeded(request.seed().clone()),
            ..CrawlState::default()
        }),
        wake: Notify::new(),
    });

    let mut workers = JoinSet::new();
    for worker_id in 0..num_workers {
        workers.spawn(worker_loop(worker_id, Arc::clone(&shared)));
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
            ::log::warn!("Worker task ended abnormally: {}", e);
        }
    }

    let mut state = shared.state.lock().await;
    let mut result = std::mem::take(&mut state.result);
    result.unattempted = state.frontier.len();

    ::log::info!(
        "Crawl complete - {} pages, {} skipped, {} unattempted",
        result.pages.len(),
        result.skipped_count(),
        result.unattempted
    );

    Ok(result)
}

async fn worker_loop<F, E>(worker_id: usize, shared: Arc<Shared<F, E>>)
where
    F: PageFetcher + ?Sized,
    E: TextExtractor + ?Sized,
{
    ::log::trace!("Worker {} started", worker_id);

    loop {
        // Registered before inspecting state so a wake-up between the check
        // and the wait is not lost
        let notified = shared.wake.notified();

        let next = {
            let mut state = shared.state.lock().await;
            next_url(&shared, &mut state)
        };

        let url = match next {
            Next::Visit(url) => url,
            Next::Wait => {
                match shared.deadline {
                    Some(d) => {
                        let _ = tokio::time::timeout_at(d, notified).await;
                    }
                    None => notified.await,
                }
                continue;
            }
            Next::Stop => break,
        };

        let visit = crawler::visit(
            shared.fetcher.as_ref(),
            shared.extractor.as_ref(),
            &shared.scope,
            &url,
        );
        let visit = match shared.deadline {
            Some(d) => tokio::time::timeout_at(d, visit).await.ok(),
            None => Some(visit.await),
        };

        {
            let mut state = shared.state.lock().await;
            state.in_flight -= 1;

            match visit {
                Some(Visit::Page { page, base, links }) => {
                    let CrawlState {
                        frontier, result, ..
                    } = &mut *state;
                    result.visited.insert(base.to_string());
                    crawler::enqueue_links(
                        &base,
                        &links,
                        &shared.request,
                        &shared.scope,
                        &result.visited,
                        frontier,
                    );
                    ::log::info!(
                        "Worker {} crawled [{}/{}]: {}",
                        worker_id,
                        result.pages.len() + 1,
                        shared.request.max_pages(),
                        url
                    );
                    result.pages.push(page);
                }
                Some(Visit::Skipped(skipped)) => {
                    ::log::warn!("Worker {} skipping {}: {}", worker_id, skipped.url, skipped.reason);
                    state.result.skipped.push(skipped);
                }
                None => {
                    ::log::warn!("Worker {} hit the deadline while fetching {}", worker_id, url);
                    state.result.timed_out = true;
                    state.finished = true;
                }
            }
        }

        shared.wake.notify_waiters();
    }

    // Whoever stops first lets the idle workers re-check and stop too
    shared.wake.notify_waiters();
    ::log::debug!("Worker {} shutting down", worker_id);
}

/// Decides what a worker does next. Must be called with the state locked.
fn next_url<F, E>(shared: &Shared<F, E>, state: &mut CrawlState) -> Next
where
    F: ?Sized,
    E: ?Sized,
{
    if state.finished {
        return Next::Stop;
    }

    if shared.deadline.is_some_and(|d| Instant::now() >= d) {
        ::log::info!("Deadline reached, stopping crawl");
        state.result.timed_out = true;
        state.finished = true;
        return Next::Stop;
    }

    let max_pages = shared.request.max_pages();
    if state.result.pages.len() >= max_pages {
        state.finished = true;
        return Next::Stop;
    }

    // Only claim while every in-flight fetch could still become a page
    while state.result.pages.len() + state.in_flight < max_pages {
        let Some(url) = state.frontier.pop() else {
            break;
        };
        if !state.result.visited.insert(url.to_string()) {
            ::log::trace!("Skipping already visited: {}", url);
            continue;
        }
        state.in_flight += 1;
        return Next::Visit(url);
    }

    if state.frontier.is_empty() && state.in_flight == 0 {
        state.finished = true;
        return Next::Stop;
    }

    Next::Wait
}
