// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `CreditLedger` + `Store` implementation for tests.
//!
//! Mirrors the SQLite store's semantics: the credit deduct is a
//! conditional decrement under one lock, monthly results are "computed"
//! by promoting staged rows, and the audit log is append-only.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use shikkha_core::types::{Batch, MonthlyResult, SmsAlert, SmsLogEntry, Student, Teacher};
use shikkha_core::{CreditLedger, ShikkhaError, Store};

#[derive(Default)]
struct Inner {
    teachers: HashMap<i64, Teacher>,
    batches: HashMap<i64, Batch>,
    students: HashMap<i64, Student>,
    logs: Vec<SmsLogEntry>,
    results: Vec<MonthlyResult>,
    staged_results: HashMap<(i32, u32), Vec<MonthlyResult>>,
    alerts: Vec<SmsAlert>,
    next_result_id: i64,
}

/// In-memory store with builder-style seeding.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    /// When set, `insert_sms_log` fails; used to prove audit-log failures
    /// never abort a bulk send.
    fail_log_writes: Arc<AtomicBool>,
    /// Artificial latency for `compute_monthly_results`, in milliseconds;
    /// used to exercise scheduler re-entrancy guards.
    compute_delay_ms: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_teacher(self, id: i64, name: &str, credits: u32) -> Self {
        self.inner.lock().await.teachers.insert(
            id,
            Teacher {
                id,
                name: name.to_string(),
                phone: None,
                sms_credits: credits,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            },
        );
        self
    }

    pub async fn with_batch(self, id: i64, name: &str, teacher_id: i64) -> Self {
        self.inner.lock().await.batches.insert(
            id,
            Batch {
                id,
                name: name.to_string(),
                teacher_id,
                subject: None,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            },
        );
        self
    }

    pub async fn with_student(
        self,
        id: i64,
        name: &str,
        batch_id: i64,
        phone: Option<&str>,
        guardian_phone: Option<&str>,
    ) -> Self {
        self.inner.lock().await.students.insert(
            id,
            Student {
                id,
                name: name.to_string(),
                batch_id,
                phone: phone.map(str::to_string),
                guardian_phone: guardian_phone.map(str::to_string),
                created_at: "2026-01-01T00:00:00.000Z".into(),
            },
        );
        self
    }

    /// Stage rows that a later `compute_monthly_results(year, month)` will
    /// promote into the persisted result set.
    pub async fn stage_results(self, year: i32, month: u32, rows: Vec<MonthlyResult>) -> Self {
        self.inner
            .lock()
            .await
            .staged_results
            .insert((year, month), rows);
        self
    }

    /// Make subsequent audit-log writes fail.
    pub fn fail_log_writes(&self, fail: bool) {
        self.fail_log_writes.store(fail, Ordering::SeqCst);
    }

    /// Slow down `compute_monthly_results` by the given delay.
    pub fn set_compute_delay_ms(&self, delay_ms: u64) {
        self.compute_delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub async fn logs(&self) -> Vec<SmsLogEntry> {
        self.inner.lock().await.logs.clone()
    }

    pub async fn alerts(&self) -> Vec<SmsAlert> {
        self.inner.lock().await.alerts.clone()
    }

    pub async fn results(&self) -> Vec<MonthlyResult> {
        self.inner.lock().await.results.clone()
    }
}

#[async_trait]
impl CreditLedger for MemoryStore {
    async fn get_credits(&self, teacher_id: i64) -> Result<u32, ShikkhaError> {
        let inner = self.inner.lock().await;
        Ok(inner.teachers.get(&teacher_id).map_or(0, |t| t.sms_credits))
    }

    async fn try_deduct_credits(
        &self,
        teacher_id: i64,
        amount: u32,
    ) -> Result<bool, ShikkhaError> {
        let mut inner = self.inner.lock().await;
        match inner.teachers.get_mut(&teacher_id) {
            Some(teacher) if teacher.sms_credits >= amount => {
                teacher.sms_credits -= amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_credits(&self, teacher_id: i64, amount: u32) -> Result<(), ShikkhaError> {
        let mut inner = self.inner.lock().await;
        match inner.teachers.get_mut(&teacher_id) {
            Some(teacher) => {
                teacher.sms_credits += amount;
                Ok(())
            }
            None => Err(ShikkhaError::NotFound {
                entity: "teacher",
                id: teacher_id.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>, ShikkhaError> {
        Ok(self.inner.lock().await.teachers.get(&id).cloned())
    }

    async fn get_batch(&self, id: i64) -> Result<Option<Batch>, ShikkhaError> {
        Ok(self.inner.lock().await.batches.get(&id).cloned())
    }

    async fn all_batches(&self) -> Result<Vec<Batch>, ShikkhaError> {
        let inner = self.inner.lock().await;
        let mut batches: Vec<Batch> = inner.batches.values().cloned().collect();
        batches.sort_by_key(|b| b.id);
        Ok(batches)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>, ShikkhaError> {
        Ok(self.inner.lock().await.students.get(&id).cloned())
    }

    async fn students_by_batch(&self, batch_id: i64) -> Result<Vec<Student>, ShikkhaError> {
        let inner = self.inner.lock().await;
        let mut students: Vec<Student> = inner
            .students
            .values()
            .filter(|s| s.batch_id == batch_id)
            .cloned()
            .collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    async fn insert_sms_log(&self, entry: &SmsLogEntry) -> Result<(), ShikkhaError> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(ShikkhaError::Storage {
                source: "simulated audit log failure".into(),
            });
        }
        self.inner.lock().await.logs.push(entry.clone());
        Ok(())
    }

    async fn results_exist(&self, year: i32, month: u32) -> Result<bool, ShikkhaError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .results
            .iter()
            .any(|r| r.year == year && r.month == month))
    }

    async fn compute_monthly_results(
        &self,
        year: i32,
        month: u32,
    ) -> Result<u32, ShikkhaError> {
        let delay = self.compute_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        let mut inner = self.inner.lock().await;
        let staged = inner.staged_results.remove(&(year, month)).unwrap_or_default();
        let count = staged.len() as u32;
        for mut row in staged {
            inner.next_result_id += 1;
            row.id = inner.next_result_id;
            inner.results.push(row);
        }
        Ok(count)
    }

    async fn monthly_results(
        &self,
        year: i32,
        month: u32,
        batch_ids: Option<&[i64]>,
    ) -> Result<Vec<MonthlyResult>, ShikkhaError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<MonthlyResult> = inner
            .results
            .iter()
            .filter(|r| r.year == year && r.month == month)
            .filter(|r| batch_ids.is_none_or(|ids| ids.contains(&r.batch_id)))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.batch_id, r.batch_rank));
        Ok(rows)
    }

    async fn mark_result_sms_sent(&self, result_id: i64) -> Result<(), ShikkhaError> {
        let mut inner = self.inner.lock().await;
        for row in &mut inner.results {
            if row.id == result_id {
                row.sms_sent = true;
            }
        }
        Ok(())
    }

    async fn insert_alert(&self, alert: &SmsAlert) -> Result<(), ShikkhaError> {
        self.inner.lock().await.alerts.push(alert.clone());
        Ok(())
    }
}

/// A staged monthly-result row for scheduler tests.
pub fn staged_result(student_id: i64, batch_id: i64, year: i32, month: u32) -> MonthlyResult {
    MonthlyResult {
        id: 0,
        student_id,
        batch_id,
        year,
        month,
        exam_count: 2,
        average_percent: 75.0,
        batch_rank: 1,
        sms_sent: false,
        created_at: "2026-01-01T00:00:00.000Z".into(),
    }
}
