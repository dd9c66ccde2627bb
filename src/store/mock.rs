//! In-memory store double with scripted failures

use super::ReadWriter;
use crate::error::{Error, Result};
use crate::types::{ExistingLinks, ReadQuery, Row};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// In-memory [`ReadWriter`] recording every write
///
/// Seeded links are what `read_existing` reports; written rows are kept per call
/// and are not folded back into the seeded links.
#[derive(Debug, Default)]
pub struct MockReadWriter {
    existing: ExistingLinks,
    read_error: Option<String>,
    write_error: Option<String>,
    writes: Mutex<Vec<Vec<Row>>>,
    reads: Mutex<Vec<ReadQuery>>,
}

impl MockReadWriter {
    /// Empty store that succeeds on every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `links` as already present
    pub fn with_existing_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing = links.into_iter().collect();
        self
    }

    /// Fail every `read_existing` with `message`
    pub fn with_read_error(mut self, message: impl Into<String>) -> Self {
        self.read_error = Some(message.into());
        self
    }

    /// Fail every `write_batch` with `message`
    ///
    /// Failed writes are still recorded so tests can inspect what was attempted.
    pub fn with_write_error(mut self, message: impl Into<String>) -> Self {
        self.write_error = Some(message.into());
        self
    }

    /// Batches passed to `write_batch`, one entry per call
    pub fn writes(&self) -> Vec<Vec<Row>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// All rows written across every call, in call order
    pub fn rows_written(&self) -> Vec<Row> {
        self.writes().into_iter().flatten().collect()
    }

    /// Number of `write_batch` calls
    pub fn write_calls(&self) -> usize {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Queries passed to `read_existing`
    pub fn reads(&self) -> Vec<ReadQuery> {
        self.reads.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Panic on another thread while holding both locks
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _reads = self.reads.lock();
                    let _writes = self.writes.lock();
                    panic!("poisoning store locks");
                })
                .join();
        });
    }
}

#[async_trait]
impl ReadWriter for MockReadWriter {
    async fn read_existing(&self, query: &ReadQuery) -> Result<ExistingLinks> {
        self.reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        match &self.read_error {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(self.existing.clone()),
        }
    }

    async fn write_batch(&self, rows: &[Row]) -> Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rows.to_vec());

        match &self.write_error {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(()),
        }
    }

    async fn clear_batch(&self) -> Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
