//! Job hunt orchestration.
//!
//! One hunt cycle reads the links already in the store, fetches every registered
//! feed concurrently, keeps the items whose link is not yet recorded, and appends
//! them to the store in a single batch.
//!
//! ```text
//! read_existing ──► spawn one worker per feed ──► drain channel ──► write_batch
//!                     │ scrape(url)                  ▲
//!                     └─ new postings ── mpsc ───────┘
//! ```
//!
//! Only the existing-links read and the batch write can fail a cycle. A feed that
//! cannot be fetched is logged and contributes nothing.

use crate::config::HuntConfig;
use crate::error::{Error, Result};
use crate::feeds::FeedRegistry;
use crate::scraper::Scraper;
use crate::store::ReadWriter;
use crate::types::{ExistingLinks, JobPosting, ReadQuery};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

mod posting;

pub use posting::{DATE_FORMAT, format_local, posting_from_item, to_rows};

/// Outcome of a successful hunt cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HuntReport {
    /// Feeds fetched this cycle
    pub feeds: usize,
    /// Postings whose link was not already in the store
    pub new_postings: usize,
    /// Whether a batch was written
    pub written: bool,
}

/// Runs hunt cycles against a scraper, a store, and a fixed feed registry
pub struct JobHunter {
    scraper: Arc<dyn Scraper>,
    store: Arc<dyn ReadWriter>,
    feeds: FeedRegistry,
    channel_capacity: usize,
}

impl JobHunter {
    /// Create a hunter scraping `config.feeds` every cycle
    pub fn new(scraper: Arc<dyn Scraper>, store: Arc<dyn ReadWriter>, config: HuntConfig) -> Self {
        Self {
            scraper,
            store,
            feeds: config.feeds,
            // A zero-capacity mpsc channel panics
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    /// Run one hunt cycle
    ///
    /// Cancelling `cancel`, or dropping the returned future, stops every in-flight
    /// fetch. Postings collected before cancellation are still written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadExisting`] if the existing links cannot be read (no feed
    /// is fetched), or [`Error::WriteBatch`] if the batch cannot be appended.
    #[instrument(skip_all, fields(feeds = self.feeds.len()))]
    pub async fn execute_job_hunt(&self, cancel: &CancellationToken) -> Result<HuntReport> {
        let existing = self
            .store
            .read_existing(&ReadQuery::links())
            .await
            .map_err(|e| {
                error!(error = %e, error_code = e.code(), "Failed to read existing links");
                Error::read_existing(e)
            })?;

        info!(existing_links = existing.len(), "Starting job hunt");

        let postings = self.collect_new_postings(Arc::new(existing), cancel).await;

        let mut report = HuntReport {
            feeds: self.feeds.len(),
            new_postings: postings.len(),
            written: false,
        };

        if postings.is_empty() {
            info!("No new jobs found");
            return Ok(report);
        }

        let rows = to_rows(postings);
        self.store.write_batch(&rows).await.map_err(|e| {
            error!(error = %e, error_code = e.code(), rows = rows.len(), "Failed to write new jobs");
            Error::write_batch(e)
        })?;

        info!(rows = rows.len(), store = self.store.name(), "Wrote new jobs");
        report.written = true;
        Ok(report)
    }

    /// Fan out one worker per feed and gather their postings
    ///
    /// The channel closes once every worker has dropped its sender, which ends
    /// the drain loop.
    async fn collect_new_postings(
        &self,
        existing: Arc<ExistingLinks>,
        cancel: &CancellationToken,
    ) -> Vec<JobPosting> {
        let scope = cancel.child_token();
        let _cancel_on_drop = scope.clone().drop_guard();

        let (tx, mut rx) = mpsc::channel(self.channel_capacity);
        let mut workers = JoinSet::new();

        for (source, url) in self.feeds.iter() {
            let worker = FeedWorker {
                scraper: Arc::clone(&self.scraper),
                existing: Arc::clone(&existing),
                source: source.to_string(),
                url: url.to_string(),
                tx: tx.clone(),
                cancel: scope.clone(),
            };
            workers.spawn(
                worker
                    .run()
                    .instrument(info_span!("process_feed", feed.source = %source)),
            );
        }
        drop(tx);

        let mut postings = Vec::new();
        while let Some(posting) = rx.recv().await {
            postings.push(posting);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Feed worker did not complete");
            }
        }

        postings
    }
}

/// Everything one fan-out task owns
struct FeedWorker {
    scraper: Arc<dyn Scraper>,
    existing: Arc<ExistingLinks>,
    source: String,
    url: String,
    tx: mpsc::Sender<JobPosting>,
    cancel: CancellationToken,
}

impl FeedWorker {
    async fn run(self) {
        let feed = match self.scraper.scrape(&self.cancel, &self.url).await {
            Ok(feed) => feed,
            Err(e) if e.is_cancelled() => {
                debug!(url = %self.url, "Feed fetch cancelled");
                return;
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, error_code = e.code(), "Failed to scrape feed");
                return;
            }
        };

        let mut new_items = 0usize;
        for item in feed.items {
            if self.existing.contains(&item.link) {
                continue;
            }

            let posting = posting_from_item(&self.source, item);
            if self.tx.send(posting).await.is_err() {
                // Receiver gone, the cycle was abandoned
                break;
            }
            new_items += 1;
        }

        info!(new_items, "Finished processing feed");
    }
}
