use std::sync::Arc;

use super::{FetchService, RequestCounter};
use crate::notify::Notifier;
use crate::rate_limit::RateLimiter;

/// Paced, counted, failure-tolerant wrapper around a [`FetchService`].
///
/// Every call waits for a slot on the shared [`RateLimiter`]. A failed fetch
/// is logged, reported through the [`Notifier`] and turned into an empty
/// document, so callers downstream simply find nothing to extract.
#[derive(Clone)]
pub struct PageFetcher {
    service: Arc<dyn FetchService>,
    limiter: Arc<RateLimiter>,
    counter: RequestCounter,
    notifier: Arc<dyn Notifier>,
}

impl PageFetcher {
    #[must_use]
    pub fn new(
        service: Arc<dyn FetchService>,
        limiter: Arc<RateLimiter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            service,
            limiter,
            counter: RequestCounter::new(),
            notifier,
        }
    }

    /// Handle to the successful-fetch counter.
    #[must_use]
    pub fn counter(&self) -> &RequestCounter {
        &self.counter
    }

    /// Fetches `url`, returning `""` if the fetch fails.
    pub async fn fetch_document(&self, url: &str) -> String {
        self.limiter.acquire().await;

        match self.service.fetch(url).await {
            Ok(body) => {
                self.counter.increment();
                tracing::debug!(url, bytes = body.len(), "fetched page");
                self.notifier.notify(&format!("✅ Page fetched: {url}"));
                body
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "page fetch failed; continuing with empty document");
                self.notifier
                    .notify(&format!("❌ Failed to fetch page: {url} - {e}"));
                self.limiter.record_failure().await;
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("limiter", &self.limiter)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}
