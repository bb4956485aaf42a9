// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for roster lookups, the SMS audit log, monthly results,
//! and teacher alerts.

use async_trait::async_trait;

use crate::error::ShikkhaError;
use crate::types::{Batch, MonthlyResult, SmsAlert, SmsLogEntry, Student, Teacher};

/// Persistence operations the dispatch core and scheduler depend on.
///
/// Roster reads are plain lookups. Audit log rows are append-only: the
/// store must never update an existing `SmsLogEntry`.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // --- Roster lookups ---

    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, ShikkhaError>;

    async fn get_batch(&self, id: i64) -> Result<Option<Batch>, ShikkhaError>;

    async fn all_batches(&self) -> Result<Vec<Batch>, ShikkhaError>;

    async fn get_student(&self, id: i64) -> Result<Option<Student>, ShikkhaError>;

    async fn students_by_batch(&self, batch_id: i64) -> Result<Vec<Student>, ShikkhaError>;

    // --- SMS audit log ---

    /// Append one immutable audit row for a send attempt.
    async fn insert_sms_log(&self, entry: &SmsLogEntry) -> Result<(), ShikkhaError>;

    // --- Monthly results ---

    /// Whether monthly-result rows already exist for (year, month).
    ///
    /// This is the idempotence marker that makes monthly processing safe
    /// to trigger repeatedly.
    async fn results_exist(&self, year: i32, month: u32) -> Result<bool, ShikkhaError>;

    /// Aggregate that month's exam scores into monthly-result rows.
    ///
    /// Returns the number of rows created. Must not be called when rows
    /// for the period already exist.
    async fn compute_monthly_results(&self, year: i32, month: u32)
    -> Result<u32, ShikkhaError>;

    /// Persisted monthly results for the period, optionally restricted to
    /// the given batches.
    async fn monthly_results(
        &self,
        year: i32,
        month: u32,
        batch_ids: Option<&[i64]>,
    ) -> Result<Vec<MonthlyResult>, ShikkhaError>;

    /// Flag a monthly-result row as having had its notification sent.
    async fn mark_result_sms_sent(&self, result_id: i64) -> Result<(), ShikkhaError>;

    // --- Teacher alerts ---

    async fn insert_alert(&self, alert: &SmsAlert) -> Result<(), ShikkhaError>;
}
