use thiserror::Error;

/// Errors that stop a crawl before it starts
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The request itself is unusable (bad seed URL, zero page budget, ...)
    #[error("invalid crawl request: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid URL pattern: {0}")]
    Filter(#[from] regex::Error),

    /// The stock HTTP client could not be built
    #[error("failed to build fetcher: {0}")]
    Client(String),
}

/// A single page could not be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fetch failed: {reason}")]
pub struct FetchError {
    pub reason: String,
}

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A fetched body could not be turned into text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse failed: {reason}")]
pub struct ParseError {
    pub reason: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
