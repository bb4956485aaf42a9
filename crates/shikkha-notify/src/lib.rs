// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk SMS orchestration for the Shikkha service.
//!
//! Provides the credit-gated [`BulkSender`]: pre-flight affordability
//! checks, the sequential send loop with deduct-on-success and an
//! append-only audit trail, read-only balance/preview helpers, and the
//! attendance and monthly-result composition helpers.

pub mod bulk;
pub mod helpers;
pub mod preview;

pub use bulk::{BulkSender, BulkSmsReport, FailedRecipient, NOT_ATTEMPTED_CODE};
pub use helpers::Attendance;
pub use preview::{BatchSmsPreview, SmsBalanceInfo};
