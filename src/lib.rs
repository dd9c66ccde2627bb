//! # job-scraper
//!
//! Periodically pulls job postings from syndication feeds and appends the ones
//! not seen before to a tabular store.
//!
//! A hunt cycle reads the links already recorded, fetches every registered feed
//! concurrently, drops items whose link is known, and writes the rest as one
//! batch. [`CycleScheduler`] runs a cycle at startup and then daily.
//!
//! ## Quick Start
//!
//! ```no_run
//! use job_scraper::{Config, CycleScheduler, JobHunter, cancel_on_shutdown};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!
//!     let hunter = Arc::new(JobHunter::new(
//!         config.build_scraper()?,
//!         config.build_store().await?,
//!         config.hunt.clone(),
//!     ));
//!
//!     let stop = CancellationToken::new();
//!     let scheduler = tokio::spawn(
//!         CycleScheduler::new(hunter, config.schedule.clone()).start(stop.clone()),
//!     );
//!
//!     cancel_on_shutdown(stop.clone()).await;
//!     scheduler.await??;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Feed source registry
pub mod feeds;
/// Hunt cycle orchestration
pub mod jobhunter;
/// Periodic cycle scheduling
pub mod scheduler;
/// Feed clients
pub mod scraper;
/// Process signal handling
pub mod shutdown;
/// Tabular store clients
pub mod store;
/// Log output setup
pub mod telemetry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, HuntConfig, SchedulerConfig};
pub use error::{DatabaseError, Error, FeedError, Result};
pub use feeds::FeedRegistry;
pub use jobhunter::{HuntReport, JobHunter};
pub use scheduler::CycleScheduler;
pub use scraper::{FeedScraper, MockScraper, Scraper};
pub use shutdown::cancel_on_shutdown;
pub use store::{MockReadWriter, ReadWriter, SqliteStore};
pub use types::{ExistingLinks, Feed, FeedItem, JobPosting, ReadQuery, Row};
