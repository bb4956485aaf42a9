// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the core `CreditLedger` and `Store` traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use shikkha_config::model::StorageConfig;
use shikkha_core::types::{Batch, MonthlyResult, SmsAlert, SmsLogEntry, Student, Teacher};
use shikkha_core::{CreditLedger, ShikkhaError, Store};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, running PRAGMA setup and migrations.
    pub async fn initialize(&self) -> Result<(), ShikkhaError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db
            .set(db)
            .map_err(|_| ShikkhaError::Storage {
                source: "storage already initialized".into(),
            })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint and release the database.
    pub async fn close(&self) -> Result<(), ShikkhaError> {
        self.db()?.close().await
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, ShikkhaError> {
        self.db.get().ok_or_else(|| ShikkhaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    // --- Reporting reads outside the core traits ---

    /// Most recent audit rows for a sender.
    pub async fn sms_logs_for_sender(
        &self,
        sender_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<SmsLogEntry>, ShikkhaError> {
        queries::sms_log::for_sender(self.db()?, sender_id, limit).await
    }

    /// Total credits ever charged to a sender.
    pub async fn total_credits_spent(&self, sender_id: i64) -> Result<u64, ShikkhaError> {
        queries::sms_log::total_credits_spent(self.db()?, sender_id).await
    }

    /// Alerts recorded for a teacher, newest first.
    pub async fn alerts_for_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<SmsAlert>, ShikkhaError> {
        queries::results::alerts_for_teacher(self.db()?, teacher_id).await
    }
}

#[async_trait]
impl CreditLedger for SqliteStore {
    async fn get_credits(&self, teacher_id: i64) -> Result<u32, ShikkhaError> {
        queries::credits::get_credits(self.db()?, teacher_id).await
    }

    async fn try_deduct_credits(
        &self,
        teacher_id: i64,
        amount: u32,
    ) -> Result<bool, ShikkhaError> {
        queries::credits::try_deduct(self.db()?, teacher_id, amount).await
    }

    async fn add_credits(&self, teacher_id: i64, amount: u32) -> Result<(), ShikkhaError> {
        queries::credits::add(self.db()?, teacher_id, amount).await
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, ShikkhaError> {
        queries::roster::get_teacher(self.db()?, id).await
    }

    async fn get_batch(&self, id: i64) -> Result<Option<Batch>, ShikkhaError> {
        queries::roster::get_batch(self.db()?, id).await
    }

    async fn all_batches(&self) -> Result<Vec<Batch>, ShikkhaError> {
        queries::roster::all_batches(self.db()?).await
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, ShikkhaError> {
        queries::roster::get_student(self.db()?, id).await
    }

    async fn students_by_batch(&self, batch_id: i64) -> Result<Vec<Student>, ShikkhaError> {
        queries::roster::students_by_batch(self.db()?, batch_id).await
    }

    async fn insert_sms_log(&self, entry: &SmsLogEntry) -> Result<(), ShikkhaError> {
        queries::sms_log::insert(self.db()?, entry).await
    }

    async fn results_exist(&self, year: i32, month: u32) -> Result<bool, ShikkhaError> {
        queries::results::results_exist(self.db()?, year, month).await
    }

    async fn compute_monthly_results(
        &self,
        year: i32,
        month: u32,
    ) -> Result<u32, ShikkhaError> {
        queries::results::compute_monthly_results(self.db()?, year, month).await
    }

    async fn monthly_results(
        &self,
        year: i32,
        month: u32,
        batch_ids: Option<&[i64]>,
    ) -> Result<Vec<MonthlyResult>, ShikkhaError> {
        queries::results::monthly_results(self.db()?, year, month, batch_ids).await
    }

    async fn mark_result_sms_sent(&self, result_id: i64) -> Result<(), ShikkhaError> {
        queries::results::mark_sms_sent(self.db()?, result_id).await
    }

    async fn insert_alert(&self, alert: &SmsAlert) -> Result<(), ShikkhaError> {
        queries::results::insert_alert(self.db()?, alert).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn queries_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("uninit.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.get_credits(1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ledger_round_trip_through_traits() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("ledger_trait.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        store
            .db()
            .unwrap()
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO teachers (name, sms_credits) VALUES ('Sir', 20)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let ledger: &dyn CreditLedger = &store;
        assert_eq!(ledger.get_credits(1).await.unwrap(), 20);
        assert!(ledger.try_deduct_credits(1, 8).await.unwrap());
        assert!(!ledger.try_deduct_credits(1, 13).await.unwrap());
        ledger.add_credits(1, 5).await.unwrap();
        assert_eq!(ledger.get_credits(1).await.unwrap(), 17);

        store.close().await.unwrap();
    }
}
