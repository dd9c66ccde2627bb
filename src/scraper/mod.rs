//! Feed fetching for the hunt cycle.
//!
//! A [`Scraper`] turns one feed URL into a parsed [`Feed`]. Two implementations ship
//! with the crate:
//! - [`FeedScraper`] fetches over HTTP and understands both RSS 2.0 and Atom
//! - [`MockScraper`] returns canned feeds or errors, for tests and dry runs
//!
//! Fetches take a [`CancellationToken`] scoped to the cycle that issued them; once it
//! fires, implementations give up and return [`FeedError::Cancelled`](crate::error::FeedError::Cancelled).

use crate::error::Result;
use crate::types::Feed;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

mod feed;
mod mock;

pub use feed::FeedScraper;
pub use mock::MockScraper;

/// Fetches and parses syndication feeds
///
/// # Examples
///
/// ```no_run
/// use job_scraper::scraper::{FeedScraper, Scraper};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let scraper = FeedScraper::new(Duration::from_secs(30), "job-scraper")?;
/// let feed = scraper
///     .scrape(&CancellationToken::new(), "https://remoteok.com/remote-jobs.rss")
///     .await?;
/// println!("{} items", feed.items.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetch `url` and parse it into a feed, items in document order
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request fails or the server answers with a non-success status
    /// - The body is neither RSS nor Atom
    /// - `cancel` fires before the fetch completes
    async fn scrape(&self, cancel: &CancellationToken, url: &str) -> Result<Feed>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
