//! Feed source registry
//!
//! Maps a human-readable source name to the syndication feed it is scraped from.
//! The registry is fixed once the process has started; every hunt cycle fans out
//! one fetch per entry.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Job boards scraped when no registry is configured
const DEFAULT_FEEDS: &[(&str, &str)] = &[
    (
        "WeWorkRemotely",
        "https://weworkremotely.com/categories/remote-programming-jobs.rss",
    ),
    ("RemoteOK", "https://remoteok.com/remote-jobs.rss"),
];

/// Read-only mapping from source name to feed URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedRegistry(BTreeMap<String, String>);

impl FeedRegistry {
    /// Build a registry from `(source, url)` pairs
    ///
    /// A later pair with the same source name replaces an earlier one.
    pub fn new<N, U>(entries: impl IntoIterator<Item = (N, U)>) -> Self
    where
        N: Into<String>,
        U: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
        )
    }

    /// Iterate over `(source, url)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, url)| (name.as_str(), url.as_str()))
    }

    /// URL registered for `source`
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    /// Number of registered feeds
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no feeds are registered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every entry has a name and an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in &self.0 {
            if name.trim().is_empty() {
                return Err(Error::config(
                    format!("feed with URL '{raw}' has an empty source name"),
                    "feeds",
                ));
            }

            let parsed = url::Url::parse(raw).map_err(|e| {
                Error::config(format!("feed '{name}' has invalid URL '{raw}': {e}"), "feeds")
            })?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(
                    format!(
                        "feed '{name}' uses unsupported scheme '{}'",
                        parsed.scheme()
                    ),
                    "feeds",
                ));
            }
        }
        Ok(())
    }
}

impl Default for FeedRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDS.iter().copied())
    }
}
