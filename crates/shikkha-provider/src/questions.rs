// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exam question generation on top of the text-generation seam.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use shikkha_core::{ShikkhaError, TextGenerator};

/// Requested difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A question-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: u32,
}

/// Build the generation prompt for a request.
pub fn build_prompt(request: &QuestionRequest) -> String {
    format!(
        "Generate {count} {difficulty} exam questions for {subject} students on the topic \
         \"{topic}\". Number each question on its own line as \"1.\", \"2.\" and so on. \
         Output only the questions, no preamble.",
        count = request.count,
        difficulty = request.difficulty,
        subject = request.subject,
        topic = request.topic,
    )
}

/// Extract numbered questions from generated text.
///
/// Accepts `1.`, `1)`, and `1:` numbering; blank and unnumbered lines are
/// ignored.
pub fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return None;
            }
            let rest = &trimmed[digits..];
            let rest = rest.strip_prefix(['.', ')', ':']).unwrap_or(rest).trim();
            if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            }
        })
        .collect()
}

/// Question generator over any [`TextGenerator`].
pub struct QuestionGenerator {
    provider: Arc<dyn TextGenerator>,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self { provider }
    }

    /// Generate questions for the request.
    ///
    /// Errors when the response contains no parseable questions; a short
    /// response with fewer questions than requested is returned as is.
    pub async fn generate_questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<String>, ShikkhaError> {
        let prompt = build_prompt(request);
        let text = self.provider.generate(&prompt).await?;
        let questions = parse_questions(&text);
        debug!(
            requested = request.count,
            parsed = questions.len(),
            "question generation finished"
        );

        if questions.is_empty() {
            return Err(ShikkhaError::Provider {
                message: "generated text contained no numbered questions".into(),
                source: None,
            });
        }
        Ok(questions)
    }
}
