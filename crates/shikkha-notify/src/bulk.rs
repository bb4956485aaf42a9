// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credit-gated bulk send orchestration.
//!
//! The critical invariant: no SMS is ever attempted unless the sender can
//! afford the entire batch. The pre-flight gate makes a partially
//! affordable batch fail whole, so teacher-visible balances stay
//! consistent with actual usage and the system never leans on the
//! upstream gateway's own balance rejection.
//!
//! Within the loop, sends are sequential and awaited one at a time:
//! credits are deducted strictly after each confirmed success, so a crash
//! mid-loop leaves the ledger consistent with the messages actually sent.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use shikkha_billing::{SmsBilling, compute_billing};
use shikkha_config::model::{BillingConfig, DispatchConfig};
use shikkha_core::types::{Recipient, SendOutcome, SendStatus, SmsKind, SmsLogEntry};
use shikkha_core::{CreditLedger, ShikkhaError, SmsTransport, Store};

/// Placeholder code for a recipient that was never attempted (pre-flight
/// rejection); real gateway codes are never 0.
pub const NOT_ATTEMPTED_CODE: u16 = 0;

/// One recipient's failure within a bulk run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRecipient {
    pub recipient: Recipient,
    /// Gateway code, or [`NOT_ATTEMPTED_CODE`] when no transport call was
    /// made.
    pub code: u16,
    pub error: String,
}

/// Aggregated result of one bulk send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSmsReport {
    /// True when at least one message went out.
    pub success: bool,
    pub sent_count: u32,
    pub failed_count: u32,
    pub total_credits_used: u32,
    /// Credits the whole batch needed at authorization time.
    pub required_credits: u32,
    pub failed: Vec<FailedRecipient>,
}

impl BulkSmsReport {
    /// A report where every recipient failed before any transport call.
    fn rejected(recipients: &[Recipient], required: u32, reason: &str) -> Self {
        Self {
            success: false,
            sent_count: 0,
            failed_count: recipients.len() as u32,
            total_credits_used: 0,
            required_credits: required,
            failed: recipients
                .iter()
                .map(|r| FailedRecipient {
                    recipient: r.clone(),
                    code: NOT_ATTEMPTED_CODE,
                    error: reason.to_string(),
                })
                .collect(),
        }
    }
}

pub(crate) struct DispatchResult {
    pub outcome: SendOutcome,
    pub charged: u32,
}

/// The bulk send orchestrator.
///
/// Holds the transport, ledger, and store seams plus the billing and
/// pacing configuration.
pub struct BulkSender {
    transport: Arc<dyn SmsTransport>,
    ledger: Arc<dyn CreditLedger>,
    store: Arc<dyn Store>,
    cost_per_part_poisha: u32,
    send_delay: Duration,
}

impl BulkSender {
    pub fn new(
        transport: Arc<dyn SmsTransport>,
        ledger: Arc<dyn CreditLedger>,
        store: Arc<dyn Store>,
        billing: &BillingConfig,
        dispatch: &DispatchConfig,
    ) -> Self {
        Self {
            transport,
            ledger,
            store,
            cost_per_part_poisha: billing.cost_per_sms_poisha,
            send_delay: Duration::from_millis(dispatch.send_delay_ms),
        }
    }

    pub(crate) fn ledger(&self) -> &dyn CreditLedger {
        self.ledger.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Compute billing for a message at the configured rate.
    pub fn billing_for(&self, message: &str) -> SmsBilling {
        compute_billing(message, self.cost_per_part_poisha)
    }

    /// Pace the gateway between consecutive sends.
    pub(crate) async fn inter_send_pause(&self) {
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
    }

    /// Send `message` to every recipient, charging the sender per
    /// successful delivery.
    ///
    /// Aborts before any transport call when the sender cannot afford the
    /// whole batch; individual failures never abort the remaining loop.
    pub async fn send_bulk(
        &self,
        recipients: &[Recipient],
        message: &str,
        sender_id: i64,
        sms_type: SmsKind,
    ) -> Result<BulkSmsReport, ShikkhaError> {
        let billing = self.billing_for(message);
        let required = billing.sms_parts * recipients.len() as u32;

        let balance = self.ledger.get_credits(sender_id).await?;
        if balance < required {
            warn!(
                sender_id,
                required,
                balance,
                recipients = recipients.len(),
                "bulk send rejected: insufficient credits"
            );
            return Ok(BulkSmsReport::rejected(
                recipients,
                required,
                &format!("insufficient SMS credits: need {required}, have {balance}"),
            ));
        }

        let mut sent_count = 0u32;
        let mut total_credits_used = 0u32;
        let mut failed = Vec::new();

        for (i, recipient) in recipients.iter().enumerate() {
            if i > 0 {
                self.inter_send_pause().await;
            }

            let result = self
                .dispatch_one(recipient, message, sender_id, sms_type, &billing)
                .await;

            if result.outcome.success {
                sent_count += 1;
                total_credits_used += result.charged;
            } else {
                failed.push(FailedRecipient {
                    recipient: recipient.clone(),
                    code: result.outcome.code,
                    error: result.outcome.message,
                });
            }
        }

        let report = BulkSmsReport {
            success: sent_count > 0,
            sent_count,
            failed_count: failed.len() as u32,
            total_credits_used,
            required_credits: required,
            failed,
        };

        info!(
            sender_id,
            sms_type = %sms_type,
            sent = report.sent_count,
            failed = report.failed_count,
            credits_used = report.total_credits_used,
            "bulk send finished"
        );

        Ok(report)
    }

    /// Send to one recipient, charge on success, and append the audit row.
    ///
    /// Every failure mode here is folded into the returned result: a
    /// ledger or audit-log error must never abort the caller's loop.
    pub(crate) async fn dispatch_one(
        &self,
        recipient: &Recipient,
        message: &str,
        sender_id: i64,
        sms_type: SmsKind,
        billing: &SmsBilling,
    ) -> DispatchResult {
        let outcome = self.transport.send(&recipient.phone, message).await;

        let charged = if outcome.success {
            // Deduct strictly after the confirmed success.
            match self
                .ledger
                .try_deduct_credits(sender_id, billing.sms_parts)
                .await
            {
                Ok(true) => billing.sms_parts,
                Ok(false) => {
                    // Another spender drained the balance mid-batch; the
                    // message went out but nothing can be charged.
                    warn!(
                        sender_id,
                        parts = billing.sms_parts,
                        "credit deduction refused mid-batch"
                    );
                    0
                }
                Err(e) => {
                    error!(sender_id, error = %e, "credit deduction errored mid-batch");
                    0
                }
            }
        } else {
            0
        };

        let status = if outcome.success {
            SendStatus::Sent
        } else {
            SendStatus::Failed
        };
        let entry = SmsLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_kind: recipient.kind,
            phone: recipient.phone.clone(),
            recipient_name: recipient.name.clone(),
            student_id: recipient.student_id,
            sms_type,
            message: message.to_string(),
            status,
            credits_used: charged,
            cost_poisha: charged * billing.cost_per_part_poisha,
            sender_id,
            created_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
        };
        if let Err(e) = self.store.insert_sms_log(&entry).await {
            error!(error = %e, phone = %recipient.phone, "failed to write sms audit log");
        }

        DispatchResult { outcome, charged }
    }
}
