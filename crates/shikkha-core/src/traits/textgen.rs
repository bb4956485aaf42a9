// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation trait for AI-assisted features (question generation).

use async_trait::async_trait;

use crate::error::ShikkhaError;

/// A text-completion collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ShikkhaError>;
}
