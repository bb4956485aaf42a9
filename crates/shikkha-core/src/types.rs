// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across collaborator traits and the Shikkha
//! workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The fixed taxonomy of bulk SMS message types.
///
/// Stored as the `sms_type` column of the audit log; rendered in
/// snake_case to match the wire/query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SmsKind {
    Attendance,
    ExamResult,
    ExamNotification,
    Notice,
    Reminder,
}

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    Student,
    Parent,
}

/// Final status of one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Sent,
    Failed,
}

/// One addressee of a bulk send.
///
/// `student_id` is set only when the recipient corresponds to a real
/// student row; parent recipients reference the same student. It is never
/// a synthetic id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub student_id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub kind: RecipientKind,
}

/// Result of a single transport send.
///
/// The transport never raises for an individual send: network and parse
/// failures are folded into an unsuccessful outcome carrying the
/// dedicated internal-error code, so a bulk loop is never interrupted by
/// one bad send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    /// Numeric gateway response code (or the internal-error code).
    pub code: u16,
    /// Human-readable description of the outcome.
    pub message: String,
    /// Gateway-assigned message id, when provided.
    pub message_id: Option<String>,
}

// --- Storage row types ---
//
// The canonical row types live here so the collaborator traits can
// reference them without depending on the storage crate.

/// A teaching account that owns SMS credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    /// Prepaid SMS credit balance. Mutated only through the ledger.
    pub sms_credits: u32,
    pub created_at: String,
}

/// A class/cohort of students, the unit of bulk-notification targeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub subject: Option<String>,
    pub created_at: String,
}

/// An enrolled student with optional own and guardian phone numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub batch_id: i64,
    pub phone: Option<String>,
    pub guardian_phone: Option<String>,
    pub created_at: String,
}

/// An immutable audit record, one per recipient per send attempt.
///
/// Created once and never updated. A failed send is recorded with
/// `credits_used = 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsLogEntry {
    /// Unique record identifier (UUID v4).
    pub id: String,
    pub recipient_kind: RecipientKind,
    pub phone: String,
    pub recipient_name: String,
    /// Real student row id, if the recipient exists as one.
    pub student_id: Option<i64>,
    pub sms_type: SmsKind,
    /// Full message text as sent.
    pub message: String,
    pub status: SendStatus,
    /// Credits charged for this attempt (0 if failed).
    pub credits_used: u32,
    /// Cost in poisha (minor currency units); 0 if failed.
    pub cost_poisha: u32,
    pub sender_id: i64,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Aggregated per-student performance for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResult {
    pub id: i64,
    pub student_id: i64,
    pub batch_id: i64,
    pub year: i32,
    pub month: u32,
    /// Number of exams taken that month.
    pub exam_count: u32,
    /// Average score across those exams, as a percentage.
    pub average_percent: f64,
    /// Rank within the batch for the month (1 = best).
    pub batch_rank: u32,
    /// Whether the result notification SMS has gone out.
    pub sms_sent: bool,
    pub created_at: String,
}

/// Category of a teacher-facing alert raised by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A batch's monthly notification was skipped for lack of credits.
    InsufficientBalance,
    /// Month-end preview of upcoming SMS volume.
    MonthEndPreview,
}

/// A teacher-facing alert recorded instead of (or ahead of) a send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsAlert {
    pub id: String,
    pub teacher_id: i64,
    pub batch_id: Option<i64>,
    pub kind: AlertKind,
    pub message: String,
    pub created_at: String,
}
