//! Feed item to posting to row conversion

use crate::types::{DATE_NOT_AVAILABLE, FeedItem, JobPosting, NEW_STATUS, Row};
use chrono::{DateTime, Local, Utc};

/// Local timestamp layout used for the date column
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the posting recorded for a new `item` scraped from `source`
pub fn posting_from_item(source: &str, item: FeedItem) -> JobPosting {
    let date_posted = date_posted(&item);

    let description = match item.content {
        Some(content) if !content.is_empty() => content,
        _ => item.description.unwrap_or_default(),
    };

    JobPosting {
        date_posted,
        source: source.to_string(),
        title: item.title,
        link: item.link,
        description,
        status: NEW_STATUS.to_string(),
    }
}

/// Publish time, else update time, else [`DATE_NOT_AVAILABLE`]
fn date_posted(item: &FeedItem) -> String {
    item.published
        .or(item.updated)
        .map(format_local)
        .unwrap_or_else(|| DATE_NOT_AVAILABLE.to_string())
}

/// Format `timestamp` in the local time zone
pub fn format_local(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(DATE_FORMAT)
        .to_string()
}

/// Convert postings to rows, keeping their order
pub fn to_rows(postings: impl IntoIterator<Item = JobPosting>) -> Vec<Row> {
    postings.into_iter().map(Row::from).collect()
}
