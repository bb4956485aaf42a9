// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly result processing scheduler.
//!
//! While running, a timer ticks hourly. On the first day of a month the
//! previous month's results are computed, persisted, and notified per
//! batch. Three guards keep this safe to run on every restart/deploy:
//!
//! - a month-key memo makes same-month re-checks a cheap no-op
//! - an `is_processing` flag skips ticks that overlap an in-flight run
//!   (process-local; fine for a single-instance deployment)
//! - the existence of monthly-result rows for the period is the real
//!   idempotence marker, checked before any work
//!
//! A batch whose teacher cannot afford its notification never blocks the
//! results themselves: the rows are saved, the SMS step is skipped, and
//! an alert is recorded for the teacher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use shikkha_core::types::{AlertKind, SmsAlert};
use shikkha_core::{CreditLedger, ShikkhaError, Store};
use shikkha_notify::BulkSender;

/// Outcome of one monthly processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    /// Result rows created by this run (0 when already processed).
    pub results_created: u32,
    /// True when the period had already been processed and the run was a
    /// no-op.
    pub already_processed: bool,
    pub batches_notified: u32,
    /// Batches whose notification was skipped for insufficient credits.
    pub batches_skipped: u32,
}

/// Snapshot of the scheduler's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub is_processing: bool,
    /// Month key (`YYYY-MM`) of the last tick check.
    pub last_checked_month: Option<String>,
}

/// The calendar month before the one containing `now`.
pub(crate) fn previous_month(now: DateTime<Utc>) -> (i32, u32) {
    if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    }
}

/// Recurring monthly result processor.
pub struct MonthlyResultScheduler {
    store: Arc<dyn Store>,
    ledger: Arc<dyn CreditLedger>,
    sender: Arc<BulkSender>,
    tick_interval: Duration,
    is_processing: AtomicBool,
    last_checked_month: Mutex<Option<String>>,
    cancel: std::sync::Mutex<Option<CancellationToken>>,
}

impl MonthlyResultScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        ledger: Arc<dyn CreditLedger>,
        sender: Arc<BulkSender>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            sender,
            tick_interval,
            is_processing: AtomicBool::new(false),
            last_checked_month: Mutex::new(None),
            cancel: std::sync::Mutex::new(None),
        }
    }

    /// Start the tick loop. A second start while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.cancel.lock().expect("scheduler lock poisoned");
        if guard.is_some() {
            warn!("monthly result scheduler already running");
            return;
        }
        let token = CancellationToken::new();
        *guard = Some(token.clone());
        drop(guard);

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("monthly result scheduler loop exited");
                        break;
                    }
                    _ = interval.tick() => {
                        this.tick(Utc::now()).await;
                    }
                }
            }
        });
        info!(
            interval_secs = self.tick_interval.as_secs(),
            "monthly result scheduler started"
        );
    }

    /// Stop future ticks. An in-flight processing run is not aborted.
    pub fn stop(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            token.cancel();
            info!("monthly result scheduler stopped");
        }
    }

    /// Current scheduler state.
    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self
                .cancel
                .lock()
                .expect("scheduler lock poisoned")
                .is_some(),
            is_processing: self.is_processing.load(Ordering::SeqCst),
            last_checked_month: self.last_checked_month.lock().await.clone(),
        }
    }

    /// One scheduler tick at the given instant.
    pub(crate) async fn tick(&self, now: DateTime<Utc>) {
        let month_key = now.format("%Y-%m").to_string();
        {
            let last = self.last_checked_month.lock().await;
            if last.as_deref() == Some(month_key.as_str()) {
                debug!(month = %month_key, "tick skipped: month already checked");
                return;
            }
        }

        if now.day() == 1 {
            let (year, month) = previous_month(now);
            match self.process_month(year, month).await {
                Ok(stats) => {
                    info!(
                        year,
                        month,
                        created = stats.results_created,
                        already = stats.already_processed,
                        notified = stats.batches_notified,
                        skipped = stats.batches_skipped,
                        "scheduled monthly processing finished"
                    );
                    *self.last_checked_month.lock().await = Some(month_key);
                }
                Err(ShikkhaError::AlreadyProcessing) => {
                    // No caller is waiting on a tick; skip silently.
                    debug!("tick skipped: processing already in flight");
                }
                Err(e) => {
                    // Leave the memo unset so the next tick retries.
                    error!(error = %e, year, month, "scheduled monthly processing failed");
                }
            }
        } else {
            *self.last_checked_month.lock().await = Some(month_key);
        }
    }

    /// Trigger processing for an explicit period (admin action), or for
    /// the previous month when not specified.
    ///
    /// Unlike the automatic tick this raises [`ShikkhaError::AlreadyProcessing`]
    /// when a run is in flight.
    pub async fn manual_trigger(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<MonthlyStats, ShikkhaError> {
        let (default_year, default_month) = previous_month(Utc::now());
        let year = year.unwrap_or(default_year);
        let month = month.unwrap_or(default_month);
        self.process_month(year, month).await
    }

    /// Compute, persist, and notify one month's results, guarded against
    /// re-entrant and repeated runs.
    pub async fn process_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<MonthlyStats, ShikkhaError> {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ShikkhaError::AlreadyProcessing);
        }

        let result = self.process_month_inner(year, month).await;
        self.is_processing.store(false, Ordering::SeqCst);
        result
    }

    async fn process_month_inner(
        &self,
        year: i32,
        month: u32,
    ) -> Result<MonthlyStats, ShikkhaError> {
        if self.store.results_exist(year, month).await? {
            info!(year, month, "monthly results already processed");
            return Ok(MonthlyStats {
                year,
                month,
                results_created: 0,
                already_processed: true,
                batches_notified: 0,
                batches_skipped: 0,
            });
        }

        let results_created = self.store.compute_monthly_results(year, month).await?;
        info!(year, month, results_created, "monthly results computed");

        let mut batches_notified = 0u32;
        let mut batches_skipped = 0u32;

        for batch in self.store.all_batches().await? {
            let batch_results = self
                .store
                .monthly_results(year, month, Some(&[batch.id]))
                .await?;
            if batch_results.is_empty() {
                continue;
            }

            let report = self
                .sender
                .send_monthly_result_sms(year, month, batch.teacher_id, Some(&[batch.id]))
                .await?;

            if report.sent_count > 0 {
                batches_notified += 1;
                continue;
            }

            // Nothing went out. When the teacher could not afford the
            // batch, record an alert instead of failing silently; the
            // results themselves stay saved either way.
            let balance = self.ledger.get_credits(batch.teacher_id).await?;
            if report.required_credits > 0 && balance < report.required_credits {
                batches_skipped += 1;
                let alert = SmsAlert {
                    id: uuid::Uuid::new_v4().to_string(),
                    teacher_id: batch.teacher_id,
                    batch_id: Some(batch.id),
                    kind: AlertKind::InsufficientBalance,
                    message: format!(
                        "{}: মাসিক ফলাফল SMS পাঠাতে {} ক্রেডিট প্রয়োজন, আছে {}",
                        batch.name, report.required_credits, balance
                    ),
                    created_at: Utc::now()
                        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                        .to_string(),
                };
                self.store.insert_alert(&alert).await?;
                warn!(
                    batch_id = batch.id,
                    teacher_id = batch.teacher_id,
                    required = report.required_credits,
                    balance,
                    "monthly result SMS skipped: insufficient credits"
                );
            }
        }

        Ok(MonthlyStats {
            year,
            month,
            results_created,
            already_processed: false,
            batches_notified,
            batches_skipped,
        })
    }
}
