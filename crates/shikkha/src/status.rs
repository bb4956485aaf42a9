// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shikkha status` command implementation.
//!
//! Read-only report for one teacher: credit balance, lifetime usage,
//! recent sends, and unhandled alerts.

use std::sync::Arc;

use shikkha_config::model::ShikkhaConfig;
use shikkha_core::{ShikkhaError, Store};
use shikkha_storage::SqliteStore;

/// Runs the `shikkha status` command.
pub async fn run_status(config: ShikkhaConfig, teacher_id: i64) -> Result<(), ShikkhaError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let teacher = store
        .get_teacher(teacher_id)
        .await?
        .ok_or(ShikkhaError::NotFound {
            entity: "teacher",
            id: teacher_id.to_string(),
        })?;

    let total_spent = store.total_credits_spent(teacher_id).await?;
    let recent = store.sms_logs_for_sender(teacher_id, Some(10)).await?;
    let alerts = store.alerts_for_teacher(teacher_id).await?;

    println!("{} (teacher #{})", teacher.name, teacher.id);
    println!("  credits remaining: {}", teacher.sms_credits);
    println!("  credits spent:     {total_spent}");

    if recent.is_empty() {
        println!("  no sends recorded");
    } else {
        println!("  last {} sends:", recent.len());
        for log in &recent {
            println!(
                "    [{}] {} {} -> {} ({} credits)",
                log.created_at, log.status, log.sms_type, log.phone, log.credits_used
            );
        }
    }

    if !alerts.is_empty() {
        println!("  alerts:");
        for alert in &alerts {
            println!("    [{}] {}: {}", alert.created_at, alert.kind, alert.message);
        }
    }

    store.close().await?;
    Ok(())
}
