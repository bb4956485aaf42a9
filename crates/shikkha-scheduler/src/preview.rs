// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Month-end SMS volume preview scheduler.
//!
//! Sibling of the monthly processor: on the day before month-end it
//! records a per-batch alert with the upcoming notification volume and
//! credit requirement, so teachers can top up before the run on the 1st.
//! It never sends anything.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use shikkha_core::types::{AlertKind, SmsAlert};
use shikkha_core::{ShikkhaError, Store};
use shikkha_notify::BulkSender;

/// Representative monthly-result text used to estimate segment count.
const SAMPLE_RESULT_MESSAGE: &str =
    "মাসিক ফলাফল 12/2026: ছাত্রের নাম 9টি পরীক্ষায় গড় 99.9%, ব্যাচে স্থান 99। - শিক্ষকের নাম";

/// Last calendar day of the given month.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Whether `now` is the day before the month's last day.
fn is_day_before_month_end(now: DateTime<Utc>) -> bool {
    now.day() == last_day_of_month(now.year(), now.month()).saturating_sub(1)
}

/// Recurring month-end volume preview.
pub struct MonthEndPreviewScheduler {
    store: Arc<dyn Store>,
    sender: Arc<BulkSender>,
    tick_interval: Duration,
    last_previewed_month: Mutex<Option<String>>,
    cancel: std::sync::Mutex<Option<CancellationToken>>,
}

impl MonthEndPreviewScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        sender: Arc<BulkSender>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            sender,
            tick_interval,
            last_previewed_month: Mutex::new(None),
            cancel: std::sync::Mutex::new(None),
        }
    }

    /// Start the tick loop. A second start while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.cancel.lock().expect("scheduler lock poisoned");
        if guard.is_some() {
            warn!("month-end preview scheduler already running");
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
                        debug!("month-end preview scheduler loop exited");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = this.tick(Utc::now()).await {
                            error!(error = %e, "month-end preview check failed");
                        }
                    }
                }
            }
        });
        info!("month-end preview scheduler started");
    }

    /// Stop future ticks.
    pub fn stop(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            token.cancel();
            info!("month-end preview scheduler stopped");
        }
    }

    /// One preview tick at the given instant.
    pub(crate) async fn tick(&self, now: DateTime<Utc>) -> Result<(), ShikkhaError> {
        if !is_day_before_month_end(now) {
            return Ok(());
        }

        let month_key = now.format("%Y-%m").to_string();
        {
            let last = self.last_previewed_month.lock().await;
            if last.as_deref() == Some(month_key.as_str()) {
                debug!(month = %month_key, "preview already recorded this month");
                return Ok(());
            }
        }

        let mut alerted = 0u32;
        for batch in self.store.all_batches().await? {
            let previews = self
                .sender
                .batch_sms_preview(Some(&[batch.id]), SAMPLE_RESULT_MESSAGE)
                .await?;
            let Some(preview) = previews.into_iter().next() else {
                continue;
            };
            if preview.total_recipients == 0 {
                continue;
            }

            let alert = SmsAlert {
                id: uuid::Uuid::new_v4().to_string(),
                teacher_id: batch.teacher_id,
                batch_id: Some(batch.id),
                kind: AlertKind::MonthEndPreview,
                message: format!(
                    "{}: আগামী মাসিক ফলাফল SMS-এর জন্য আনুমানিক {} ক্রেডিট প্রয়োজন ({} প্রাপক)",
                    preview.batch_name, preview.sms_required, preview.total_recipients
                ),
                created_at: now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            };
            self.store.insert_alert(&alert).await?;
            alerted += 1;
        }

        *self.last_previewed_month.lock().await = Some(month_key);
        info!(alerted, "month-end SMS volume preview recorded");
        Ok(())
    }
}
