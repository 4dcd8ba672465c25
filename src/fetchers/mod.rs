//! Stock [`PageFetcher`](crate::crawlers::crawler::PageFetcher) implementations

pub mod http;
pub mod webdriver;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;
