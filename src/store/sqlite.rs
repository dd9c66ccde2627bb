//! SQLite-backed posting table.

use super::{ColumnRange, ReadWriter};
use crate::error::{DatabaseError, Error, Result};
use crate::types::{ExistingLinks, ReadQuery, Row};
use async_trait::async_trait;
use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::path::Path;
use std::str::FromStr;

/// Persistent posting store
///
/// Rows live in a single `postings` table whose columns follow the row layout
/// (date posted, source, title, link, description, status). The table schema takes
/// the place of a spreadsheet header row.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations
    pub async fn open(path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to create database directory: {}",
                    e
                )))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to parse database path: {}",
                    e
                )))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to connect to database: {}",
                e
            )))
        })?;

        let store = Self { pool };
        store.run_migrations().await?;

        tracing::debug!(path = %path.display(), "Opened posting store");
        Ok(store)
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Every stored row in append order
    pub async fn rows(&self) -> Result<Vec<Row>> {
        let records: Vec<(String, String, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT date_posted, source, title, link, description, status
            FROM postings
            ORDER BY row_num ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to read postings: {}",
                e
            )))
        })?;

        Ok(records
            .into_iter()
            .map(|(date, source, title, link, description, status)| {
                Row([date, source, title, link, description, status])
            })
            .collect())
    }

    async fn run_migrations(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            Error::Database(DatabaseError::ConnectionFailed(format!(
                "Failed to acquire connection: {}",
                e
            )))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::MigrationFailed(format!(
                "Failed to create schema_version table: {}",
                e
            )))
        })?;

        let current_version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| {
                    Error::Database(DatabaseError::QueryFailed(format!(
                        "Failed to query schema version: {}",
                        e
                    )))
                })?;

        if current_version.unwrap_or(0) < 1 {
            Self::migrate_v1(&mut conn).await?;
        }

        Ok(())
    }

    /// Migration v1: postings table
    async fn migrate_v1(conn: &mut SqliteConnection) -> Result<()> {
        tracing::info!("Applying store migration v1");

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::MigrationFailed(format!(
                    "Failed to begin transaction: {}",
                    e
                )))
            })?;

        let result = async {
            sqlx::query(
                r#"
                CREATE TABLE postings (
                    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
                    date_posted TEXT NOT NULL,
                    source TEXT NOT NULL,
                    title TEXT NOT NULL,
                    link TEXT NOT NULL,
                    description TEXT NOT NULL,
                    status TEXT NOT NULL,
                    appended_at INTEGER NOT NULL
                )
                "#,
            )
            .execute(&mut *conn)
            .await?;

            sqlx::query("CREATE INDEX idx_postings_link ON postings(link)")
                .execute(&mut *conn)
                .await?;

            sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (1, ?)")
                .bind(chrono::Utc::now().timestamp())
                .execute(&mut *conn)
                .await?;

            Ok::<(), sqlx::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| {
                        Error::Database(DatabaseError::MigrationFailed(format!(
                            "Failed to commit migration v1: {}",
                            e
                        )))
                    })?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(Error::Database(DatabaseError::MigrationFailed(format!(
                    "Failed to create postings table: {}",
                    e
                ))));
            }
        }

        tracing::info!("Store migration v1 complete");
        Ok(())
    }
}

#[async_trait]
impl ReadWriter for SqliteStore {
    async fn read_existing(&self, query: &ReadQuery) -> Result<ExistingLinks> {
        let range = ColumnRange::parse(&query.range)?;

        // Rows read through a range that stops short of the link column carry no link
        if !range.contains(Row::LINK_COLUMN) {
            tracing::debug!(range = %query.range, "Range excludes link column");
            return Ok(ExistingLinks::new());
        }

        // Empty links are keys like any other; items without a link dedup on ""
        let links: Vec<String> = sqlx::query_scalar("SELECT DISTINCT link FROM postings")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to read existing links: {}",
                    e
                )))
            })?;

        tracing::debug!(count = links.len(), "Read existing links");
        Ok(links.into_iter().collect())
    }

    async fn write_batch(&self, rows: &[Row]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let [date_posted, source, title, link, description, status] = row.cells();
            sqlx::query(
                r#"
                INSERT INTO postings (date_posted, source, title, link, description, status, appended_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(date_posted)
            .bind(source)
            .bind(title)
            .bind(link)
            .bind(description)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to append posting: {}",
                    e
                )))
            })?;
        }

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to commit batch: {}",
                e
            )))
        })?;

        tracing::debug!(records_written = rows.len(), "Appended postings");
        Ok(())
    }

    async fn clear_batch(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM postings")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to clear postings: {}",
                    e
                )))
            })?;

        // Restart row numbering just below the header
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'postings'")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
