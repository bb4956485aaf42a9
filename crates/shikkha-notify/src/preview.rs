// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only balance and batch preview helpers.
//!
//! These never mutate state; teachers use them to see what a send would
//! cost before committing, and the scheduler uses them for month-end
//! volume warnings.

use serde::{Deserialize, Serialize};

use shikkha_core::ShikkhaError;

use crate::bulk::BulkSender;

/// Affordability summary for a prospective send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsBalanceInfo {
    pub has_balance: bool,
    pub current_balance: u32,
    pub required_credits: u32,
    pub recipient_count: u32,
    /// Parts one copy of the message bills for.
    pub sms_parts: u32,
}

/// Per-batch recipient counts and credit requirement for a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSmsPreview {
    pub batch_id: i64,
    pub batch_name: String,
    /// Students reachable on their own phone.
    pub student_count: u32,
    /// Students reachable via a guardian phone.
    pub parent_count: u32,
    pub total_recipients: u32,
    pub sms_required: u32,
}

impl BulkSender {
    /// Whether `user_id` can afford `message` to `recipient_count`
    /// recipients. Pure read.
    pub async fn check_balance(
        &self,
        user_id: i64,
        recipient_count: u32,
        message: &str,
    ) -> Result<SmsBalanceInfo, ShikkhaError> {
        let billing = self.billing_for(message);
        let required_credits = billing.sms_parts * recipient_count;
        let current_balance = self.ledger().get_credits(user_id).await?;

        Ok(SmsBalanceInfo {
            has_balance: current_balance >= required_credits,
            current_balance,
            required_credits,
            recipient_count,
            sms_parts: billing.sms_parts,
        })
    }

    /// Recipient counts and credit requirement per batch for a sample
    /// message. All batches when `batch_ids` is `None`.
    pub async fn batch_sms_preview(
        &self,
        batch_ids: Option<&[i64]>,
        message: &str,
    ) -> Result<Vec<BatchSmsPreview>, ShikkhaError> {
        let billing = self.billing_for(message);

        let batches = match batch_ids {
            Some(ids) => {
                let mut batches = Vec::with_capacity(ids.len());
                for &id in ids {
                    let batch =
                        self.store()
                            .get_batch(id)
                            .await?
                            .ok_or(ShikkhaError::NotFound {
                                entity: "batch",
                                id: id.to_string(),
                            })?;
                    batches.push(batch);
                }
                batches
            }
            None => self.store().all_batches().await?,
        };

        let mut previews = Vec::with_capacity(batches.len());
        for batch in batches {
            let students = self.store().students_by_batch(batch.id).await?;
            let student_count = students.iter().filter(|s| s.phone.is_some()).count() as u32;
            let parent_count = students
                .iter()
                .filter(|s| s.guardian_phone.is_some())
                .count() as u32;
            let total_recipients = student_count + parent_count;

            previews.push(BatchSmsPreview {
                batch_id: batch.id,
                batch_name: batch.name,
                student_count,
                parent_count,
                total_recipients,
                sms_required: total_recipients * billing.sms_parts,
            });
        }

        Ok(previews)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shikkha_config::model::{BillingConfig, DispatchConfig};
    use shikkha_test_utils::{MemoryStore, MockTransport};

    use super::*;

    async fn seeded_store() -> MemoryStore {
        MemoryStore::new()
            .with_teacher(1, "Sir", 20)
            .await
            .with_batch(1, "SSC-26", 1)
            .await
            .with_batch(2, "HSC-27", 1)
            .await
            // Batch 1: one student with both phones, one guardian-only,
            // one unreachable.
            .with_student(1, "Asif", 1, Some("01811111111"), Some("01911111111"))
            .await
            .with_student(2, "Mitu", 1, None, Some("01922222222"))
            .await
            .with_student(3, "Rafi", 1, None, None)
            .await
            // Batch 2: one student-phone-only.
            .with_student(4, "Nabila", 2, Some("01844444444"), None)
            .await
    }

    fn bulk(store: MemoryStore) -> BulkSender {
        BulkSender::new(
            Arc::new(MockTransport::new()),
            Arc::new(store.clone()),
            Arc::new(store),
            &BillingConfig::default(),
            &DispatchConfig { send_delay_ms: 0 },
        )
    }

    #[tokio::test]
    async fn check_balance_reports_affordability() {
        let store = seeded_store().await;
        let bulk = bulk(store);

        let info = bulk.check_balance(1, 15, "one part").await.unwrap();
        assert!(info.has_balance);
        assert_eq!(info.current_balance, 20);
        assert_eq!(info.required_credits, 15);
        assert_eq!(info.sms_parts, 1);

        let info = bulk.check_balance(1, 21, "one part").await.unwrap();
        assert!(!info.has_balance);
        assert_eq!(info.required_credits, 21);
    }

    #[tokio::test]
    async fn check_balance_accounts_for_multipart() {
        let store = seeded_store().await;
        let bulk = bulk(store);

        // Two-part Bengali message: 10 recipients need 20 credits.
        let message = "ক".repeat(70);
        let info = bulk.check_balance(1, 10, &message).await.unwrap();
        assert_eq!(info.sms_parts, 2);
        assert_eq!(info.required_credits, 20);
        assert!(info.has_balance);
    }

    #[tokio::test]
    async fn preview_counts_reachable_recipients_per_batch() {
        let store = seeded_store().await;
        let bulk = bulk(store);

        let previews = bulk.batch_sms_preview(None, "hello").await.unwrap();
        assert_eq!(previews.len(), 2);

        let b1 = &previews[0];
        assert_eq!(b1.batch_id, 1);
        assert_eq!(b1.batch_name, "SSC-26");
        assert_eq!(b1.student_count, 1);
        assert_eq!(b1.parent_count, 2);
        assert_eq!(b1.total_recipients, 3);
        assert_eq!(b1.sms_required, 3);

        let b2 = &previews[1];
        assert_eq!(b2.student_count, 1);
        assert_eq!(b2.parent_count, 0);
        assert_eq!(b2.sms_required, 1);
    }

    #[tokio::test]
    async fn preview_scales_with_message_parts() {
        let store = seeded_store().await;
        let bulk = bulk(store);

        let message = "ক".repeat(70);
        let previews = bulk.batch_sms_preview(Some(&[1]), &message).await.unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].total_recipients, 3);
        assert_eq!(previews[0].sms_required, 6);
    }

    #[tokio::test]
    async fn preview_unknown_batch_errors() {
        let store = seeded_store().await;
        let bulk = bulk(store);

        let err = bulk.batch_sms_preview(Some(&[99]), "hi").await.unwrap_err();
        assert!(matches!(err, ShikkhaError::NotFound { entity: "batch", .. }));
    }
}
