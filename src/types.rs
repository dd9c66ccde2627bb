//! Core types for job-scraper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Status given to every freshly discovered posting
pub const NEW_STATUS: &str = "New";

/// Placeholder date used when a feed item carries no usable timestamp
pub const DATE_NOT_AVAILABLE: &str = "N/A";

/// Column range the orchestrator reads to collect existing links
pub const LINK_READ_RANGE: &str = "A:D";

/// One discovered job posting
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Local timestamp formatted as `YYYY-MM-DD HH:MM:SS`, or [`DATE_NOT_AVAILABLE`]
    pub date_posted: String,
    /// Registry name of the feed this posting came from
    pub source: String,
    /// Feed item title
    pub title: String,
    /// Feed item URL, the deduplication key
    pub link: String,
    /// Content body, falling back to the summary; empty when neither exists
    pub description: String,
    /// Always [`NEW_STATUS`] for postings produced by a hunt cycle
    pub status: String,
}

/// Positional six-column record as appended to the store
///
/// Columns are, in order: date posted, source, title, link, description, status.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub [String; 6]);

impl Row {
    /// Number of columns in a row
    pub const WIDTH: usize = 6;

    /// Zero-based index of the link column (column D)
    pub const LINK_COLUMN: usize = 3;

    /// Borrow the cells in column order
    pub fn cells(&self) -> &[String; Self::WIDTH] {
        &self.0
    }

    /// The link cell
    pub fn link(&self) -> &str {
        &self.0[Self::LINK_COLUMN]
    }
}

impl From<JobPosting> for Row {
    fn from(job: JobPosting) -> Self {
        Row([
            job.date_posted,
            job.source,
            job.title,
            job.link,
            job.description,
            job.status,
        ])
    }
}

/// Links already present in the store at the start of a cycle
///
/// Membership is exact string equality; links are never normalised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExistingLinks(HashSet<String>);

impl ExistingLinks {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `link` is already recorded
    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    /// Number of distinct links
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExistingLinks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Query descriptor passed to [`ReadWriter::read_existing`](crate::store::ReadWriter::read_existing)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadQuery {
    /// Spreadsheet-style column range, e.g. `A:D`
    pub range: String,
}

impl ReadQuery {
    /// Build a query over the given column range
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
        }
    }

    /// The query every hunt cycle issues
    pub fn links() -> Self {
        Self::new(LINK_READ_RANGE)
    }
}

/// One item of a parsed RSS or Atom feed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedItem {
    /// Item title
    pub title: String,
    /// Item link/URL
    pub link: String,
    /// Full content body (`content:encoded` for RSS, `content` for Atom)
    pub content: Option<String>,
    /// Summary or description
    pub description: Option<String>,
    /// Parsed publication timestamp
    pub published: Option<DateTime<Utc>>,
    /// Parsed last-updated timestamp
    pub updated: Option<DateTime<Utc>>,
}

/// A parsed feed, items in document order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feed {
    /// Channel/feed title
    pub title: String,
    /// Items in the order the feed lists them
    pub items: Vec<FeedItem>,
}
