// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and
//! lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use shikkha_core::ShikkhaError;
use tracing::debug;

/// Convert a tokio-rusqlite error into ShikkhaError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ShikkhaError {
    ShikkhaError::Storage {
        source: Box::new(e),
    }
}

/// A single-writer SQLite handle.
///
/// Opening runs the PRAGMA setup and all pending migrations.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    wal_mode: bool,
}

impl Database {
    /// Open (creating if needed) the database at `path` with WAL mode.
    pub async fn open(path: &str) -> Result<Self, ShikkhaError> {
        Self::open_with_options(path, true).await
    }

    /// Open the database with an explicit WAL-mode choice.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, ShikkhaError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ShikkhaError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ShikkhaError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), ShikkhaError> {
            let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal_mode};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;"
            ))
            .map_err(|e| ShikkhaError::Storage {
                source: Box::new(e),
            })?;
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| ShikkhaError::Storage {
            source: Box::new(e),
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn, wal_mode })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), ShikkhaError> {
        if self.wal_mode {
            self.conn
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());

        // Migrations created the core tables.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
                     AND name IN ('teachers', 'students', 'sms_logs', 'monthly_results')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 4);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen_test.db");
        {
            let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open must not re-run applied migrations.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("db.sqlite");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }
}
