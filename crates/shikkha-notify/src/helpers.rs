// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Higher-level send helpers built on the orchestrator.
//!
//! These load the referenced entities, compose the message text, and
//! dispatch through the same credit-gated path. A stale student, teacher,
//! or batch id raises `NotFound` -- a caller bug, distinct from
//! per-recipient send failures.

use tracing::{info, warn};

use shikkha_core::types::{Recipient, RecipientKind, SmsKind};
use shikkha_core::{ShikkhaError, Student};

use crate::bulk::{BulkSender, BulkSmsReport, FailedRecipient, NOT_ATTEMPTED_CODE};

/// One day's attendance fact for a student.
#[derive(Debug, Clone)]
pub struct Attendance {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub present: bool,
}

/// Guardian-facing phone for a student: guardian number first, the
/// student's own as fallback.
fn guardian_phone(student: &Student) -> Option<String> {
    student
        .guardian_phone
        .clone()
        .or_else(|| student.phone.clone())
}

impl BulkSender {
    /// Notify a student's guardian about one day's attendance.
    pub async fn send_attendance_sms(
        &self,
        student_id: i64,
        batch_id: i64,
        attendance: &Attendance,
        teacher_id: i64,
    ) -> Result<BulkSmsReport, ShikkhaError> {
        let student = self
            .store()
            .get_student(student_id)
            .await?
            .ok_or(ShikkhaError::NotFound {
                entity: "student",
                id: student_id.to_string(),
            })?;
        let batch = self
            .store()
            .get_batch(batch_id)
            .await?
            .ok_or(ShikkhaError::NotFound {
                entity: "batch",
                id: batch_id.to_string(),
            })?;
        let teacher = self
            .store()
            .get_teacher(teacher_id)
            .await?
            .ok_or(ShikkhaError::NotFound {
                entity: "teacher",
                id: teacher_id.to_string(),
            })?;

        let phone = guardian_phone(&student).ok_or(ShikkhaError::NotFound {
            entity: "guardian phone for student",
            id: student_id.to_string(),
        })?;

        let status_word = if attendance.present {
            "উপস্থিত"
        } else {
            "অনুপস্থিত"
        };
        let message = format!(
            "প্রিয় অভিভাবক, {} {} তারিখে {} ক্লাসে {} ছিল। - {}",
            student.name, attendance.date, batch.name, status_word, teacher.name
        );

        let recipient = Recipient {
            student_id: Some(student.id),
            name: student.name.clone(),
            phone,
            kind: RecipientKind::Parent,
        };

        self.send_bulk(&[recipient], &message, teacher_id, SmsKind::Attendance)
            .await
    }

    /// Notify guardians about the month's persisted results, one
    /// individualized message per student.
    ///
    /// The whole run is credit-gated up front like any bulk send; each
    /// delivered notification flips its result row's sms flag.
    pub async fn send_monthly_result_sms(
        &self,
        year: i32,
        month: u32,
        teacher_id: i64,
        batch_ids: Option<&[i64]>,
    ) -> Result<BulkSmsReport, ShikkhaError> {
        let teacher = self
            .store()
            .get_teacher(teacher_id)
            .await?
            .ok_or(ShikkhaError::NotFound {
                entity: "teacher",
                id: teacher_id.to_string(),
            })?;

        let results = self
            .store()
            .monthly_results(year, month, batch_ids)
            .await?;

        // Compose per-student messages; students without a reachable
        // phone become failure rows without a transport call.
        let mut items: Vec<(i64, Recipient, String, u32)> = Vec::new();
        let mut failed: Vec<FailedRecipient> = Vec::new();
        let mut required = 0u32;

        for result in &results {
            let student = self
                .store()
                .get_student(result.student_id)
                .await?
                .ok_or(ShikkhaError::NotFound {
                    entity: "student",
                    id: result.student_id.to_string(),
                })?;

            let message = format!(
                "মাসিক ফলাফল {}/{}: {} {}টি পরীক্ষায় গড় {:.1}%, ব্যাচে স্থান {}। - {}",
                month,
                year,
                student.name,
                result.exam_count,
                result.average_percent,
                result.batch_rank,
                teacher.name
            );

            match guardian_phone(&student) {
                Some(phone) => {
                    let parts = self.billing_for(&message).sms_parts;
                    required += parts;
                    items.push((
                        result.id,
                        Recipient {
                            student_id: Some(student.id),
                            name: student.name.clone(),
                            phone,
                            kind: RecipientKind::Parent,
                        },
                        message,
                        parts,
                    ));
                }
                None => {
                    warn!(student_id = student.id, "no reachable phone for monthly result");
                    failed.push(FailedRecipient {
                        recipient: Recipient {
                            student_id: Some(student.id),
                            name: student.name.clone(),
                            phone: String::new(),
                            kind: RecipientKind::Parent,
                        },
                        code: NOT_ATTEMPTED_CODE,
                        error: "no reachable phone number".into(),
                    });
                }
            }
        }

        let balance = self.ledger().get_credits(teacher_id).await?;
        if balance < required {
            warn!(
                teacher_id,
                required, balance, "monthly result SMS rejected: insufficient credits"
            );
            for (_, recipient, _, _) in items {
                failed.push(FailedRecipient {
                    recipient,
                    code: NOT_ATTEMPTED_CODE,
                    error: format!(
                        "insufficient SMS credits: need {required}, have {balance}"
                    ),
                });
            }
            return Ok(BulkSmsReport {
                success: false,
                sent_count: 0,
                failed_count: failed.len() as u32,
                total_credits_used: 0,
                required_credits: required,
                failed,
            });
        }

        let mut sent_count = 0u32;
        let mut total_credits_used = 0u32;

        for (i, (result_id, recipient, message, _parts)) in items.iter().enumerate() {
            if i > 0 {
                self.inter_send_pause().await;
            }

            let billing = self.billing_for(message);
            let result = self
                .dispatch_one(recipient, message, teacher_id, SmsKind::ExamResult, &billing)
                .await;

            if result.outcome.success {
                sent_count += 1;
                total_credits_used += result.charged;
                self.store().mark_result_sms_sent(*result_id).await?;
            } else {
                failed.push(FailedRecipient {
                    recipient: recipient.clone(),
                    code: result.outcome.code,
                    error: result.outcome.message,
                });
            }
        }

        info!(
            teacher_id,
            year,
            month,
            sent = sent_count,
            failed = failed.len(),
            "monthly result notifications finished"
        );

        Ok(BulkSmsReport {
            success: sent_count > 0,
            sent_count,
            failed_count: failed.len() as u32,
            total_credits_used,
            required_credits: required,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shikkha_config::model::{BillingConfig, DispatchConfig};
    use shikkha_core::{CreditLedger, SendStatus, Store};
    use shikkha_test_utils::{MemoryStore, MockTransport, failed_outcome, staged_result};

    use super::*;

    async fn seeded_store(credits: u32) -> MemoryStore {
        MemoryStore::new()
            .with_teacher(1, "Karim Sir", credits)
            .await
            .with_batch(1, "SSC-26", 1)
            .await
            .with_student(1, "Asif", 1, Some("01811111111"), Some("01911111111"))
            .await
            .with_student(2, "Mitu", 1, None, Some("01922222222"))
            .await
            .with_student(3, "Rafi", 1, None, None)
            .await
    }

    fn bulk(transport: MockTransport, store: MemoryStore) -> BulkSender {
        BulkSender::new(
            Arc::new(transport),
            Arc::new(store.clone()),
            Arc::new(store),
            &BillingConfig::default(),
            &DispatchConfig { send_delay_ms: 0 },
        )
    }

    #[tokio::test]
    async fn attendance_sms_goes_to_guardian() {
        let transport = MockTransport::new();
        let store = seeded_store(10).await;
        let bulk = bulk(transport.clone(), store.clone());

        let attendance = Attendance {
            date: "2026-03-05".into(),
            present: false,
        };
        let report = bulk
            .send_attendance_sms(1, 1, &attendance, 1)
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.sent_count, 1);

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "01911111111", "guardian number preferred");
        assert!(calls[0].1.contains("Asif"));
        assert!(calls[0].1.contains("2026-03-05"));
        assert!(calls[0].1.contains("অনুপস্থিত"));

        let logs = store.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].sms_type, SmsKind::Attendance);
        assert_eq!(logs[0].student_id, Some(1));
    }

    #[tokio::test]
    async fn attendance_sms_stale_ids_raise_not_found() {
        let store = seeded_store(10).await;
        let bulk = bulk(MockTransport::new(), store);

        let attendance = Attendance {
            date: "2026-03-05".into(),
            present: true,
        };

        let err = bulk
            .send_attendance_sms(99, 1, &attendance, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ShikkhaError::NotFound { entity: "student", .. }));

        let err = bulk
            .send_attendance_sms(1, 99, &attendance, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ShikkhaError::NotFound { entity: "batch", .. }));

        let err = bulk
            .send_attendance_sms(1, 1, &attendance, 99)
            .await
            .unwrap_err();
        assert!(matches!(err, ShikkhaError::NotFound { entity: "teacher", .. }));
    }

    #[tokio::test]
    async fn attendance_sms_unreachable_student_raises() {
        let store = seeded_store(10).await;
        let bulk = bulk(MockTransport::new(), store);

        let attendance = Attendance {
            date: "2026-03-05".into(),
            present: true,
        };
        // Rafi has no phone at all.
        let err = bulk
            .send_attendance_sms(3, 1, &attendance, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ShikkhaError::NotFound { .. }));
    }

    #[tokio::test]
    async fn monthly_results_send_individualized_messages() {
        let transport = MockTransport::new();
        let store = seeded_store(50)
            .await
            .stage_results(
                2026,
                3,
                vec![staged_result(1, 1, 2026, 3), {
                    let mut r = staged_result(2, 1, 2026, 3);
                    r.average_percent = 62.5;
                    r.batch_rank = 2;
                    r
                }],
            )
            .await;
        store.compute_monthly_results(2026, 3).await.unwrap();
        let bulk = bulk(transport.clone(), store.clone());

        let report = bulk
            .send_monthly_result_sms(2026, 3, 1, None)
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.sent_count, 2);
        assert_eq!(report.failed_count, 0);

        let calls = transport.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.contains("Asif"));
        assert!(calls[0].1.contains("75.0%"));
        assert!(calls[1].1.contains("Mitu"));
        assert!(calls[1].1.contains("62.5%"));
        assert!(calls[1].1.contains("স্থান 2"));

        // Delivered rows are flagged.
        let results = store.results().await;
        assert!(results.iter().all(|r| r.sms_sent));

        // Audit rows are exam_result type.
        let logs = store.logs().await;
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.sms_type == SmsKind::ExamResult));
    }

    #[tokio::test]
    async fn monthly_results_insufficient_balance_sends_nothing() {
        let transport = MockTransport::new();
        let store = seeded_store(1)
            .await
            .stage_results(
                2026,
                3,
                vec![staged_result(1, 1, 2026, 3), staged_result(2, 1, 2026, 3)],
            )
            .await;
        store.compute_monthly_results(2026, 3).await.unwrap();
        let bulk = bulk(transport.clone(), store.clone());

        let report = bulk
            .send_monthly_result_sms(2026, 3, 1, None)
            .await
            .unwrap();

        assert!(!report.success);
        assert_eq!(report.sent_count, 0);
        assert_eq!(report.total_credits_used, 0);
        assert_eq!(transport.call_count().await, 0);
        assert_eq!(store.get_credits(1).await.unwrap(), 1);
        assert!(store.results().await.iter().all(|r| !r.sms_sent));
    }

    #[tokio::test]
    async fn monthly_results_skip_unreachable_students() {
        let transport = MockTransport::new();
        let store = seeded_store(50)
            .await
            .stage_results(
                2026,
                3,
                // Rafi (id 3) has no phone.
                vec![staged_result(1, 1, 2026, 3), staged_result(3, 1, 2026, 3)],
            )
            .await;
        store.compute_monthly_results(2026, 3).await.unwrap();
        let bulk = bulk(transport.clone(), store.clone());

        let report = bulk
            .send_monthly_result_sms(2026, 3, 1, None)
            .await
            .unwrap();

        assert_eq!(report.sent_count, 1);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.failed[0].code, NOT_ATTEMPTED_CODE);
        assert!(report.failed[0].error.contains("no reachable phone"));
        assert_eq!(transport.call_count().await, 1);
    }

    #[tokio::test]
    async fn monthly_result_transport_failure_keeps_flag_unset() {
        let transport = MockTransport::with_outcomes(vec![
            failed_outcome(1001, "invalid number"),
        ]);
        let store = seeded_store(50)
            .await
            .stage_results(2026, 3, vec![staged_result(1, 1, 2026, 3)])
            .await;
        store.compute_monthly_results(2026, 3).await.unwrap();
        let bulk = bulk(transport, store.clone());

        let report = bulk
            .send_monthly_result_sms(2026, 3, 1, None)
            .await
            .unwrap();

        assert!(!report.success);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.failed[0].code, 1001);
        assert!(store.results().await.iter().all(|r| !r.sms_sent));
        assert_eq!(store.get_credits(1).await.unwrap(), 50);

        // Failed attempt is still audited with zero charge.
        let logs = store.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SendStatus::Failed);
        assert_eq!(logs[0].credits_used, 0);
    }
}
