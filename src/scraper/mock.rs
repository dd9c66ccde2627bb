//! Scripted scraper for tests and dry runs

use super::Scraper;
use crate::error::{Error, FeedError, Result};
use crate::types::Feed;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
enum Response {
    Feed(Feed),
    Error(String),
    /// Never resolves on its own; only cancellation ends the fetch
    Hang,
}

/// Scraper returning configured feeds or errors without touching the network
///
/// Every URL gets the default response unless a per-URL override is set.
///
/// # Examples
///
/// ```
/// use job_scraper::scraper::{MockScraper, Scraper};
/// use job_scraper::types::Feed;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let scraper = MockScraper::new()
///     .with_feed(Feed::default())
///     .with_error_for("https://down.example.com/rss", "connection refused");
///
/// let cancel = CancellationToken::new();
/// assert!(scraper.scrape(&cancel, "https://up.example.com/rss").await.is_ok());
/// assert!(scraper.scrape(&cancel, "https://down.example.com/rss").await.is_err());
/// # }
/// ```
#[derive(Debug)]
pub struct MockScraper {
    default: Response,
    overrides: HashMap<String, Response>,
    delay: Option<Duration>,
    requested: Mutex<Vec<String>>,
}

impl MockScraper {
    /// Mock returning an empty feed for every URL
    pub fn new() -> Self {
        Self {
            default: Response::Feed(Feed::default()),
            overrides: HashMap::new(),
            delay: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Return `feed` for every URL without an override
    pub fn with_feed(mut self, feed: Feed) -> Self {
        self.default = Response::Feed(feed);
        self
    }

    /// Fail every URL without an override with `message`
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.default = Response::Error(message.into());
        self
    }

    /// Block every URL without an override until the fetch is cancelled
    pub fn hang_until_cancelled(mut self) -> Self {
        self.default = Response::Hang;
        self
    }

    /// Return `feed` for `url`
    pub fn with_feed_for(mut self, url: impl Into<String>, feed: Feed) -> Self {
        self.overrides.insert(url.into(), Response::Feed(feed));
        self
    }

    /// Fail `url` with `message`
    pub fn with_error_for(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.overrides
            .insert(url.into(), Response::Error(message.into()));
        self
    }

    /// Block `url` until the fetch is cancelled
    pub fn hang_for(mut self, url: impl Into<String>) -> Self {
        self.overrides.insert(url.into(), Response::Hang);
        self
    }

    /// Wait `delay` before answering each fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far, in call order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of fetches so far
    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Panic on another thread while holding the request log
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _requested = self.requested.lock();
                    panic!("poisoning request log");
                })
                .join();
        });
    }

    async fn respond(&self, url: &str) -> Result<Feed> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.overrides.get(url).unwrap_or(&self.default) {
            Response::Feed(feed) => Ok(feed.clone()),
            Response::Error(message) => Err(Error::Other(message.clone())),
            Response::Hang => std::future::pending().await,
        }
    }
}

impl Default for MockScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scraper for MockScraper {
    async fn scrape(&self, cancel: &CancellationToken, url: &str) -> Result<Feed> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FeedError::Cancelled { url: url.to_string() }.into()),
            result = self.respond(url) => result,
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
