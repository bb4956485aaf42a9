// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI text-generation provider for the Shikkha service.
//!
//! Implements the core [`TextGenerator`](shikkha_core::TextGenerator)
//! seam over the Gemini API with an explicit per-key state machine for
//! quota rotation, plus the exam question-generation helper built on it.

pub mod client;
pub mod keypool;
pub mod questions;

pub use client::GeminiClient;
pub use keypool::{KeyPool, KeyState};
pub use questions::{Difficulty, QuestionGenerator, QuestionRequest};
