//! Tabular storage for discovered postings.
//!
//! The store behaves like a spreadsheet: a header followed by appended rows of six
//! columns (A-F). Callers read the links already recorded, append batches, and can
//! wipe every data row for maintenance.
//!
//! ## Implementations
//!
//! - [`SqliteStore`]: persistent SQLite table, one row per posting
//! - [`MockReadWriter`]: in-memory double with scripted failures

use crate::error::{Error, Result};
use crate::types::{ExistingLinks, ReadQuery, Row};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

mod mock;
mod sqlite;

pub use mock::MockReadWriter;
pub use sqlite::SqliteStore;

/// Reads existing links from and appends rows to a tabular store
#[async_trait]
pub trait ReadWriter: Send + Sync {
    /// Collect the link column within `query`'s range, skipping the header
    ///
    /// # Errors
    ///
    /// Returns an error if the range is malformed or the store cannot be read.
    async fn read_existing(&self, query: &ReadQuery) -> Result<ExistingLinks>;

    /// Append `rows` after the existing data; never overwrites
    ///
    /// An empty batch succeeds without touching the store.
    async fn write_batch(&self, rows: &[Row]) -> Result<()>;

    /// Delete every data row below the header
    async fn clear_batch(&self) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Parsed spreadsheet-style column range such as `A:D` or `B2:F`
///
/// Row numbers are accepted for compatibility but only the columns matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnRange {
    /// First column, zero-based
    pub start: usize,
    /// Last column, zero-based and inclusive
    pub end: usize,
}

impl ColumnRange {
    /// Parse `range`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] when the text is not `<col>[row]:<col>[row]`
    /// or the columns are reversed.
    pub fn parse(range: &str) -> Result<Self> {
        static RANGE_RE: OnceLock<Regex> = OnceLock::new();
        let re = RANGE_RE.get_or_init(|| {
            #[allow(clippy::expect_used)]
            Regex::new(r"^([A-Za-z]{1,3})\d*:([A-Za-z]{1,3})\d*$").expect("range pattern is valid")
        });

        let caps = re
            .captures(range.trim())
            .ok_or_else(|| Error::InvalidQuery(format!("unable to parse range '{range}'")))?;

        let start = column_index(&caps[1]);
        let end = column_index(&caps[2]);
        if start > end {
            return Err(Error::InvalidQuery(format!(
                "range '{range}' ends before it starts"
            )));
        }

        Ok(Self { start, end })
    }

    /// Whether zero-based `column` lies within the range
    pub fn contains(&self, column: usize) -> bool {
        (self.start..=self.end).contains(&column)
    }
}

/// Convert column letters to a zero-based index (A = 0, Z = 25, AA = 26)
fn column_index(letters: &str) -> usize {
    letters
        .bytes()
        .map(|b| (b.to_ascii_uppercase() - b'A') as usize + 1)
        .fold(0, |acc, digit| acc * 26 + digit)
        - 1
}
