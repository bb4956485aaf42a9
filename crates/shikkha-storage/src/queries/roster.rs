// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster lookups: teachers, batches, students.

use rusqlite::{OptionalExtension, Row, params};
use shikkha_core::ShikkhaError;

use crate::database::Database;
use crate::models::{Batch, Student, Teacher};

fn teacher_from_row(row: &Row<'_>) -> Result<Teacher, rusqlite::Error> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        sms_credits: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn batch_from_row(row: &Row<'_>) -> Result<Batch, rusqlite::Error> {
    Ok(Batch {
        id: row.get(0)?,
        name: row.get(1)?,
        teacher_id: row.get(2)?,
        subject: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn student_from_row(row: &Row<'_>) -> Result<Student, rusqlite::Error> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        batch_id: row.get(2)?,
        phone: row.get(3)?,
        guardian_phone: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub async fn get_teacher(db: &Database, id: i64) -> Result<Option<Teacher>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Option<Teacher>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, name, phone, sms_credits, created_at \
                 FROM teachers WHERE id = ?1",
                params![id],
                teacher_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_batch(db: &Database, id: i64) -> Result<Option<Batch>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Option<Batch>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, name, teacher_id, subject, created_at \
                 FROM batches WHERE id = ?1",
                params![id],
                batch_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn all_batches(db: &Database) -> Result<Vec<Batch>, ShikkhaError> {
    db.connection()
        .call(|conn| -> Result<Vec<Batch>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, teacher_id, subject, created_at \
                 FROM batches ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], batch_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_student(db: &Database, id: i64) -> Result<Option<Student>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Option<Student>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, name, batch_id, phone, guardian_phone, created_at \
                 FROM students WHERE id = ?1",
                params![id],
                student_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn students_by_batch(
    db: &Database,
    batch_id: i64,
) -> Result<Vec<Student>, ShikkhaError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Student>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, name, batch_id, phone, guardian_phone, created_at \
                 FROM students WHERE batch_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![batch_id], student_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
