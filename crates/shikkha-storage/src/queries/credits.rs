// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credit ledger operations.
//!
//! `try_deduct` is a single conditional UPDATE so concurrent sends for the
//! same teacher can never spend below zero: the balance check and the
//! decrement happen in one statement on the single writer thread.

use rusqlite::{OptionalExtension, params};
use shikkha_core::ShikkhaError;

use crate::database::Database;

/// Current credit balance. Unknown teachers read as 0.
pub async fn get_credits(db: &Database, teacher_id: i64) -> Result<u32, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<u32, rusqlite::Error> {
            let credits = conn
                .query_row(
                    "SELECT sms_credits FROM teachers WHERE id = ?1",
                    params![teacher_id],
                    |row| row.get::<_, u32>(0),
                )
                .optional()?;
            Ok(credits.unwrap_or(0))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Deduct `amount` credits if and only if the balance covers it.
///
/// Returns whether a row changed. `false` means insufficient balance or
/// no such teacher; the balance is never partially deducted.
pub async fn try_deduct(
    db: &Database,
    teacher_id: i64,
    amount: u32,
) -> Result<bool, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE teachers SET sms_credits = sms_credits - ?2 \
                 WHERE id = ?1 AND sms_credits >= ?2",
                params![teacher_id, amount],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Credit `amount` to the teacher's balance.
pub async fn add(db: &Database, teacher_id: i64, amount: u32) -> Result<(), ShikkhaError> {
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE teachers SET sms_credits = sms_credits + ?2 WHERE id = ?1",
                params![teacher_id, amount],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(ShikkhaError::NotFound {
            entity: "teacher",
            id: teacher_id.to_string(),
        });
    }
    Ok(())
}
