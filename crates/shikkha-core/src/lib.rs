// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Shikkha coaching-center service.
//!
//! This crate provides the foundational trait definitions, error types,
//! and domain types used throughout the Shikkha workspace: the credit
//! ledger and storage seams, the SMS transport contract, and the shared
//! row/enum types they exchange.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ShikkhaError;
pub use types::{
    AlertKind, Batch, MonthlyResult, Recipient, RecipientKind, SendOutcome, SendStatus,
    SmsAlert, SmsKind, SmsLogEntry, Student, Teacher,
};

pub use traits::{CreditLedger, SmsTransport, Store, TextGenerator};
