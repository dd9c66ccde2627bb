//! Error types for job-scraper
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Feed, Database, Config, etc.)
//! - Stage-wrapping variants for the fatal steps of a hunt cycle
//! - Machine-readable error codes for structured logging

use thiserror::Error;

/// Result type alias for job-scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for job-scraper
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "READ_WRITER")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Feed fetch or parse error
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Store client failure not covered by a more specific variant
    #[error("store error: {0}")]
    Store(String),

    /// Malformed store query descriptor (e.g. a bad column range)
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Reading the existing-links set failed; fatal for the cycle
    #[error("failed to read existing links: {0}")]
    ReadExisting(#[source] Box<Error>),

    /// Appending the cycle's batch failed; fatal for the cycle
    #[error("failed to write batch: {0}")]
    WriteBatch(#[source] Box<Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Feed-related errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed endpoint answered with a non-success status
    #[error("feed returned HTTP {status}: {url}")]
    HttpStatus {
        /// HTTP status code returned by the server
        status: u16,
        /// The feed URL that was requested
        url: String,
    },

    /// Content could be parsed neither as RSS nor as Atom
    #[error("failed to parse feed as RSS or Atom. RSS error: {rss}. Atom error: {atom}")]
    Parse {
        /// Error reported by the RSS parser
        rss: String,
        /// Error reported by the Atom parser
        atom: String,
    },

    /// The fetch was abandoned because its cycle was cancelled
    #[error("fetch cancelled: {url}")]
    Cancelled {
        /// The feed URL whose fetch was cancelled
        url: String,
    },
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Wrap an error raised while reading the existing-links set
    pub fn read_existing(err: Error) -> Self {
        Error::ReadExisting(Box::new(err))
    }

    /// Wrap an error raised while appending a batch of rows
    pub fn write_batch(err: Error) -> Self {
        Error::WriteBatch(Box::new(err))
    }

    /// Whether this error stems from cancellation rather than a real failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Feed(FeedError::Cancelled { .. }))
    }

    /// Machine-readable error code, stable across message wording changes
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::Network(_) => "network_error",
            Error::Feed(FeedError::HttpStatus { .. }) => "feed_http_error",
            Error::Feed(FeedError::Parse { .. }) => "feed_parse_error",
            Error::Feed(FeedError::Cancelled { .. }) => "cancelled",
            Error::Store(_) => "store_error",
            Error::InvalidQuery(_) => "invalid_query",
            Error::ReadExisting(_) => "read_existing_failed",
            Error::WriteBatch(_) => "write_batch_failed",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }
}
