//! HTTP feed scraper for RSS 2.0 and Atom feeds

use super::Scraper;
use crate::error::{Error, FeedError, Result};
use crate::types::{Feed, FeedItem};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Scraper that fetches feeds over HTTP
///
/// The body is parsed as RSS first; if that fails it is parsed as Atom.
pub struct FeedScraper {
    http_client: reqwest::Client,
}

impl FeedScraper {
    /// Create a scraper with the given per-request timeout and user agent
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    async fn fetch(&self, url: &str) -> Result<Feed> {
        debug!(url, "Fetching feed");

        let response = self.http_client.get(url).send().await?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let content = response.text().await?;
        parse_feed(&content)
    }
}

#[async_trait]
impl Scraper for FeedScraper {
    async fn scrape(&self, cancel: &CancellationToken, url: &str) -> Result<Feed> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FeedError::Cancelled { url: url.to_string() }.into()),
            result = self.fetch(url) => result,
        }
    }

    fn name(&self) -> &'static str {
        "feed"
    }
}

/// Parse feed content, trying RSS then Atom
pub(crate) fn parse_feed(content: &str) -> Result<Feed> {
    match parse_as_rss(content) {
        Ok(feed) => {
            debug!("Successfully parsed as RSS, found {} items", feed.items.len());
            Ok(feed)
        }
        Err(rss_err) => {
            debug!("Failed to parse as RSS: {}, trying Atom", rss_err);
            match parse_as_atom(content) {
                Ok(feed) => {
                    debug!("Successfully parsed as Atom, found {} items", feed.items.len());
                    Ok(feed)
                }
                Err(atom_err) => Err(FeedError::Parse {
                    rss: rss_err,
                    atom: atom_err,
                }
                .into()),
            }
        }
    }
}

fn parse_as_rss(content: &str) -> std::result::Result<Feed, String> {
    let channel = content
        .parse::<rss::Channel>()
        .map_err(|e| format!("RSS parse error: {}", e))?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or("").to_string(),
            link: item.link().unwrap_or("").to_string(),
            content: item.content().map(|c| c.to_string()),
            description: item.description().map(|d| d.to_string()),
            published: item.pub_date().and_then(parse_timestamp),
            // RSS has no item-level updated field; Dublin Core dc:date is the usual stand-in
            updated: item
                .dublin_core_ext()
                .and_then(|dc| dc.dates().first())
                .and_then(|date| parse_timestamp(date)),
        })
        .collect();

    Ok(Feed {
        title: channel.title().to_string(),
        items,
    })
}

fn parse_as_atom(content: &str) -> std::result::Result<Feed, String> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes())
        .map_err(|e| format!("Atom parse error: {}", e))?;

    let items = feed
        .entries()
        .iter()
        .map(|entry| {
            // Prefer the alternate link, fall back to whatever comes first
            let link = entry
                .links()
                .iter()
                .find(|link| link.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|link| link.href().to_string())
                .unwrap_or_default();

            FeedItem {
                title: entry.title().as_str().to_string(),
                link,
                content: entry
                    .content()
                    .and_then(|c| c.value().map(|v| v.to_string())),
                description: entry.summary().map(|s| s.as_str().to_string()),
                published: entry.published().and_then(|dt| parse_timestamp(&dt.to_rfc3339())),
                updated: parse_timestamp(&entry.updated().to_rfc3339()),
            }
        })
        .collect();

    Ok(Feed {
        title: feed.title().as_str().to_string(),
        items,
    })
}

/// Parse an RFC 2822 or RFC 3339 timestamp into UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
