//! Page retrieval through a JS-rendering scraping proxy.
//!
//! [`FetchService`] is the seam between the engine and the network. The
//! production implementation, [`ScrapingProxyClient`], asks a scraping proxy
//! to render the target URL and returns the HTML body. The engine never talks
//! to a `FetchService` directly: it goes through [`PageFetcher`], which adds
//! pacing, request counting, notifications and the "failure means empty
//! document" policy.

mod counter;
mod fetcher;
pub mod urls;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::ScraperError;

pub use counter::RequestCounter;
pub use fetcher::PageFetcher;

/// Retrieves the document text behind a URL.
#[async_trait]
pub trait FetchService: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ScraperError`] when the document cannot be retrieved.
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;
}

/// HTTP client for a ScrapingBee-style rendering proxy:
/// `GET {base}?api_key=...&url=...&render_js=true`.
pub struct ScrapingProxyClient {
    client: Client,
    base_url: Url,
    api_key: String,
    render_js: bool,
}

impl ScrapingProxyClient {
    /// Creates a client with the given timeout and browser `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        render_js: bool,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
            render_js,
        })
    }

    /// Builds the proxy request URL for `target`.
    fn request_url(&self, target: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", target)
            .append_pair("render_js", if self.render_js { "true" } else { "false" });
        url
    }
}

impl std::fmt::Debug for ScrapingProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapingProxyClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("render_js", &self.render_js)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FetchService for ScrapingProxyClient {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(self.request_url(url))
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
