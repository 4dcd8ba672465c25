pub mod bfs;
pub mod concurrent;
pub mod crawler;

#[cfg(test)]
mod tests;

pub use bfs::crawl;
pub use concurrent::crawl_concurrent;
pub use crawler::{CrawlRequest, Extracted, FetchedPage, PageFetcher, TextExtractor};
