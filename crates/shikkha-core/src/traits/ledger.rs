// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credit ledger trait: the single mutation path for SMS credit balances.

use async_trait::async_trait;

use crate::error::ShikkhaError;

/// Tracks per-teacher prepaid SMS credit balances.
///
/// Balances never go negative: `try_deduct_credits` is the only way to
/// spend, and the implementation must make it a single atomic conditional
/// decrement so concurrent sends for the same teacher cannot overspend.
#[async_trait]
pub trait CreditLedger: Send + Sync + 'static {
    /// Current credit balance for the teacher. Unknown teachers read as 0.
    async fn get_credits(&self, teacher_id: i64) -> Result<u32, ShikkhaError>;

    /// Deduct `amount` credits if and only if the balance covers it.
    ///
    /// Returns whether the deduction happened; `false` means the balance
    /// was insufficient or the teacher does not exist. Never partial.
    async fn try_deduct_credits(
        &self,
        teacher_id: i64,
        amount: u32,
    ) -> Result<bool, ShikkhaError>;

    /// Credit `amount` to the teacher's balance (top-up fulfilment).
    async fn add_credits(&self, teacher_id: i64, amount: u32) -> Result<(), ShikkhaError>;
}
