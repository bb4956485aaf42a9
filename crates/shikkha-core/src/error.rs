// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Shikkha coaching-center service.

use thiserror::Error;

/// The primary error type used across all Shikkha collaborator traits and
/// core operations.
#[derive(Debug, Error)]
pub enum ShikkhaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// SMS transport errors outside the per-send outcome contract
    /// (client construction, malformed gateway URL).
    #[error("sms transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text-generation provider errors (API failure, all keys exhausted).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity (student, teacher, batch) does not exist.
    ///
    /// Raised by the higher-level send helpers for stale ids; these are
    /// caller bugs, distinct from per-recipient send failures.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The sender cannot afford the requested operation.
    #[error("insufficient SMS credits: need {required}, have {available}")]
    InsufficientCredits { required: u32, available: u32 },

    /// A monthly processing run is already in flight.
    #[error("monthly result processing already in progress")]
    AlreadyProcessing,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
