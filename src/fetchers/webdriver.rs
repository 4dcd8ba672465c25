use crate::crawlers::crawler::{FetchedPage, PageFetcher};
use crate::error::FetchError;
use crate::utils::page_timeout;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 45;

/// Ports other common WebDriver servers listen on
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver
    "http://localhost:4723", // Appium
    "http://localhost:9222", // Chrome debug port
    "http://127.0.0.1:4444",
];

/// Fetches pages through a headless browser so JavaScript-rendered content
/// is visible to the extractor.
///
/// One browser session is shared, so navigations are serialized. WebDriver
/// does not expose HTTP status codes; a page that loads is reported as 200.
pub struct WebDriverFetcher {
    webdriver_url: String,
    base_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    /// Creates the fetcher; the session is opened lazily on first fetch
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            base_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            client: Mutex::new(None),
        }
    }

    pub fn with_page_timeout(mut self, base_timeout: Duration) -> Self {
        self.base_timeout = base_timeout;
        self
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    /// Ends the browser session, if one was opened
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    async fn connect(&self) -> Option<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Some(client);
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", self.webdriver_url, e);
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS
            .iter()
            .filter(|url| **url != self.webdriver_url)
        {
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Some(client);
            }
        }

        ::log::error!(
            "Failed to connect to any WebDriver server; start one or set WEBDRIVER_URL"
        );
        None
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut slot = self.client.lock().await;

        if slot.is_none() {
            *slot = self.connect().await;
        }
        let Some(client) = slot.as_ref() else {
            return Err(FetchError::new("no WebDriver session available"));
        };

        let budget = page_timeout(self.base_timeout, url);
        let first = match timeout(budget, navigate(client, url)).await {
            Ok(result) => result,
            Err(_) => return Err(FetchError::new(format!("page load exceeded {:?}", budget))),
        };

        let (source, final_url) = match first {
            Ok(loaded) => loaded,
            Err(e) if is_lost_session(&e) => {
                ::log::warn!("Lost WebDriver session while loading {}, reconnecting", url);
                *slot = None;
                let Ok(client) = ClientBuilder::native().connect(&self.webdriver_url).await else {
                    return Err(FetchError::new("WebDriver session lost and reconnect failed"));
                };
                let retried = timeout(budget, navigate(&client, url)).await;
                *slot = Some(client);
                match retried {
                    Ok(Ok(loaded)) => loaded,
                    Ok(Err(e)) => return Err(FetchError::new(e.to_string())),
                    Err(_) => {
                        return Err(FetchError::new(format!("page load exceeded {:?}", budget)));
                    }
                }
            }
            Err(e) => return Err(FetchError::new(e.to_string())),
        };

        Ok(FetchedPage::new(200, source.into_bytes()).with_final_url(final_url))
    }
}

/// Loads the page and returns its source with the URL the browser ended up on
async fn navigate(client: &Client, url: &Url) -> Result<(String, Url), CmdError> {
    client.goto(url.as_str()).await?;
    let final_url = client.current_url().await?;
    let source = client.source().await?;
    Ok((source, final_url))
}

fn is_lost_session(error: &CmdError) -> bool {
    let message = error.to_string();
    message.contains("Unable to find session") || message.contains("invalid session id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        let fetcher = WebDriverFetcher::new("http://localhost:4444");
        assert_eq!(fetcher.webdriver_url(), "http://localhost:4444");
        assert_eq!(fetcher.base_timeout, Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS));
    }

    #[test]
    fn test_page_timeout_override() {
        let fetcher = WebDriverFetcher::new(DEFAULT_WEBDRIVER_URL).with_page_timeout(Duration::from_secs(5));
        assert_eq!(fetcher.base_timeout, Duration::from_secs(5));
    }
}
