// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly result aggregation and teacher alert operations.

use rusqlite::types::Type;
use rusqlite::{Row, params};
use shikkha_core::ShikkhaError;

use crate::database::Database;
use crate::models::{MonthlyResult, SmsAlert};

fn result_from_row(row: &Row<'_>) -> Result<MonthlyResult, rusqlite::Error> {
    Ok(MonthlyResult {
        id: row.get(0)?,
        student_id: row.get(1)?,
        batch_id: row.get(2)?,
        year: row.get(3)?,
        month: row.get(4)?,
        exam_count: row.get(5)?,
        average_percent: row.get(6)?,
        batch_rank: row.get(7)?,
        sms_sent: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
    })
}

/// Whether monthly-result rows already exist for the period.
///
/// This is the idempotence marker for monthly processing: it is checked
/// before every scheduled or manual trigger.
pub async fn results_exist(db: &Database, year: i32, month: u32) -> Result<bool, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM monthly_results WHERE year = ?1 AND month = ?2)",
                params![year, month],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate the period's exam scores into monthly-result rows.
///
/// One row per (student, batch) that took at least one exam that month:
/// exam count, average percentage, and rank within the batch. Returns the
/// number of rows created.
pub async fn compute_monthly_results(
    db: &Database,
    year: i32,
    month: u32,
) -> Result<u32, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<u32, rusqlite::Error> {
            let created = conn.execute(
                "INSERT INTO monthly_results \
                 (student_id, batch_id, year, month, exam_count, average_percent, \
                  batch_rank, sms_sent) \
                 SELECT student_id, batch_id, ?1, ?2, exam_count, average_percent, \
                        RANK() OVER (PARTITION BY batch_id ORDER BY average_percent DESC), 0 \
                 FROM ( \
                     SELECT er.student_id AS student_id, e.batch_id AS batch_id, \
                            COUNT(*) AS exam_count, \
                            AVG(er.marks_obtained * 100.0 / e.total_marks) AS average_percent \
                     FROM exam_results er \
                     JOIN exams e ON e.id = er.exam_id \
                     WHERE CAST(strftime('%Y', e.exam_date) AS INTEGER) = ?1 \
                       AND CAST(strftime('%m', e.exam_date) AS INTEGER) = ?2 \
                     GROUP BY er.student_id, e.batch_id \
                 )",
                params![year, month],
            )?;
            Ok(created as u32)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persisted monthly results for the period, optionally restricted to the
/// given batches. Ordered by batch, then rank.
pub async fn monthly_results(
    db: &Database,
    year: i32,
    month: u32,
    batch_ids: Option<&[i64]>,
) -> Result<Vec<MonthlyResult>, ShikkhaError> {
    let filter = batch_ids.map(|ids| ids.to_vec());
    db.connection()
        .call(move |conn| -> Result<Vec<MonthlyResult>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, student_id, batch_id, year, month, exam_count, \
                 average_percent, batch_rank, sms_sent, created_at \
                 FROM monthly_results WHERE year = ?1 AND month = ?2 \
                 ORDER BY batch_id ASC, batch_rank ASC",
            )?;
            let mut rows: Vec<MonthlyResult> = stmt
                .query_map(params![year, month], result_from_row)?
                .collect::<Result<_, _>>()?;
            if let Some(ids) = filter {
                rows.retain(|r| ids.contains(&r.batch_id));
            }
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a monthly-result row's notification as sent.
pub async fn mark_sms_sent(db: &Database, result_id: i64) -> Result<(), ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE monthly_results SET sms_sent = 1 WHERE id = ?1",
                params![result_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn alert_from_row(row: &Row<'_>) -> Result<SmsAlert, rusqlite::Error> {
    let kind: String = row.get(3)?;
    Ok(SmsAlert {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        batch_id: row.get(2)?,
        kind: kind
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        message: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Record a teacher-facing alert.
pub async fn insert_alert(db: &Database, alert: &SmsAlert) -> Result<(), ShikkhaError> {
    let alert = alert.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO sms_alerts (id, teacher_id, batch_id, kind, message, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    alert.id,
                    alert.teacher_id,
                    alert.batch_id,
                    alert.kind.to_string(),
                    alert.message,
                    alert.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Alerts for a teacher, newest first.
pub async fn alerts_for_teacher(
    db: &Database,
    teacher_id: i64,
) -> Result<Vec<SmsAlert>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Vec<SmsAlert>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, teacher_id, batch_id, kind, message, created_at \
                 FROM sms_alerts WHERE teacher_id = ?1 \
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![teacher_id], alert_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shikkha_core::AlertKind;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("results_test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    /// Seed one batch with three students and two March-2026 exams.
    ///
    /// Scores: Asif 80/100 + 90/100, Mitu 60/100 + 70/100, Rafi sat only
    /// the first exam with 50/100.
    async fn seed_exams(db: &Database) -> i64 {
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.execute_batch(
                    "INSERT INTO teachers (name, sms_credits) VALUES ('Sir', 100);
                     INSERT INTO batches (name, teacher_id) VALUES ('SSC-26', 1);
                     INSERT INTO students (name, batch_id, guardian_phone) VALUES
                         ('Asif', 1, '01911111111'),
                         ('Mitu', 1, '01922222222'),
                         ('Rafi', 1, '01933333333');
                     INSERT INTO exams (batch_id, name, exam_date, total_marks) VALUES
                         (1, 'Weekly 1', '2026-03-07', 100.0),
                         (1, 'Weekly 2', '2026-03-21', 100.0);
                     INSERT INTO exam_results (exam_id, student_id, marks_obtained) VALUES
                         (1, 1, 80.0), (2, 1, 90.0),
                         (1, 2, 60.0), (2, 2, 70.0),
                         (1, 3, 50.0);",
                )?;
                Ok(1)
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn compute_creates_ranked_rows() {
        let (db, _dir) = setup_db().await;
        seed_exams(&db).await;

        assert!(!results_exist(&db, 2026, 3).await.unwrap());

        let created = compute_monthly_results(&db, 2026, 3).await.unwrap();
        assert_eq!(created, 3);
        assert!(results_exist(&db, 2026, 3).await.unwrap());

        let results = monthly_results(&db, 2026, 3, None).await.unwrap();
        assert_eq!(results.len(), 3);

        // Ordered by rank: Asif (85%), Mitu (65%), Rafi (50%).
        assert_eq!(results[0].student_id, 1);
        assert_eq!(results[0].batch_rank, 1);
        assert_eq!(results[0].exam_count, 2);
        assert!((results[0].average_percent - 85.0).abs() < 1e-9);

        assert_eq!(results[1].student_id, 2);
        assert_eq!(results[1].batch_rank, 2);

        assert_eq!(results[2].student_id, 3);
        assert_eq!(results[2].batch_rank, 3);
        assert_eq!(results[2].exam_count, 1);
        assert!(!results[2].sms_sent);
    }

    #[tokio::test]
    async fn months_without_exams_create_nothing() {
        let (db, _dir) = setup_db().await;
        seed_exams(&db).await;

        let created = compute_monthly_results(&db, 2026, 4).await.unwrap();
        assert_eq!(created, 0);
        assert!(!results_exist(&db, 2026, 4).await.unwrap());
    }

    #[tokio::test]
    async fn batch_filter_restricts_results() {
        let (db, _dir) = setup_db().await;
        seed_exams(&db).await;
        compute_monthly_results(&db, 2026, 3).await.unwrap();

        let hit = monthly_results(&db, 2026, 3, Some(&[1])).await.unwrap();
        assert_eq!(hit.len(), 3);
        let miss = monthly_results(&db, 2026, 3, Some(&[42])).await.unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn mark_sms_sent_flips_flag() {
        let (db, _dir) = setup_db().await;
        seed_exams(&db).await;
        compute_monthly_results(&db, 2026, 3).await.unwrap();

        let results = monthly_results(&db, 2026, 3, None).await.unwrap();
        mark_sms_sent(&db, results[0].id).await.unwrap();

        let reread = monthly_results(&db, 2026, 3, None).await.unwrap();
        assert!(reread[0].sms_sent);
        assert!(!reread[1].sms_sent);
    }

    #[tokio::test]
    async fn alerts_round_trip() {
        let (db, _dir) = setup_db().await;
        seed_exams(&db).await;

        let alert = SmsAlert {
            id: uuid::Uuid::new_v4().to_string(),
            teacher_id: 1,
            batch_id: Some(1),
            kind: AlertKind::InsufficientBalance,
            message: "SSC-26: need 12 credits, have 3".into(),
            created_at: "2026-04-01T08:00:00.000Z".into(),
        };
        insert_alert(&db, &alert).await.unwrap();

        let alerts = alerts_for_teacher(&db, 1).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::InsufficientBalance);
        assert_eq!(alerts[0].batch_id, Some(1));
    }
}
