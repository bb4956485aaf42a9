// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only SMS audit log operations.
//!
//! Rows are inserted once, never updated or deleted.

use rusqlite::types::Type;
use rusqlite::{Row, params};
use shikkha_core::ShikkhaError;

use crate::database::Database;
use crate::models::SmsLogEntry;

fn parse_column<T: std::str::FromStr>(
    idx: usize,
    value: String,
) -> Result<T, rusqlite::Error>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn log_from_row(row: &Row<'_>) -> Result<SmsLogEntry, rusqlite::Error> {
    Ok(SmsLogEntry {
        id: row.get(0)?,
        recipient_kind: parse_column(1, row.get::<_, String>(1)?)?,
        phone: row.get(2)?,
        recipient_name: row.get(3)?,
        student_id: row.get(4)?,
        sms_type: parse_column(5, row.get::<_, String>(5)?)?,
        message: row.get(6)?,
        status: parse_column(7, row.get::<_, String>(7)?)?,
        credits_used: row.get(8)?,
        cost_poisha: row.get(9)?,
        sender_id: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Append one audit row.
pub async fn insert(db: &Database, entry: &SmsLogEntry) -> Result<(), ShikkhaError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO sms_logs (id, recipient_kind, phone, recipient_name, \
                 student_id, sms_type, message, status, credits_used, cost_poisha, \
                 sender_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    entry.id,
                    entry.recipient_kind.to_string(),
                    entry.phone,
                    entry.recipient_name,
                    entry.student_id,
                    entry.sms_type.to_string(),
                    entry.message,
                    entry.status.to_string(),
                    entry.credits_used,
                    entry.cost_poisha,
                    entry.sender_id,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent audit rows for a sender, newest first.
pub async fn for_sender(
    db: &Database,
    sender_id: i64,
    limit: Option<i64>,
) -> Result<Vec<SmsLogEntry>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Vec<SmsLogEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, recipient_kind, phone, recipient_name, student_id, \
                 sms_type, message, status, credits_used, cost_poisha, sender_id, \
                 created_at \
                 FROM sms_logs WHERE sender_id = ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![sender_id, limit.unwrap_or(-1)], log_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total credits ever charged to a sender.
pub async fn total_credits_spent(db: &Database, sender_id: i64) -> Result<u64, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            conn.query_row(
                "SELECT COALESCE(SUM(credits_used), 0) FROM sms_logs WHERE sender_id = ?1",
                params![sender_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
