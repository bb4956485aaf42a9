// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini text-generation API.
//!
//! Quota-exhausted responses (HTTP 429 or a `RESOURCE_EXHAUSTED` error
//! body) transition the used key in the pool and the call retries on the
//! next eligible key; any other failure surfaces immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use shikkha_config::model::AiConfig;
use shikkha_core::{ShikkhaError, TextGenerator};

use crate::keypool::KeyPool;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

enum CallFailure {
    /// The key's quota is exhausted; rotate and retry.
    Quota(String),
    /// Everything else; surface to the caller.
    Other(ShikkhaError),
}

/// Gemini API client with key rotation.
pub struct GeminiClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    pool: Mutex<KeyPool>,
}

impl GeminiClient {
    /// Creates a client from configuration. Requires at least one API key.
    pub fn new(config: &AiConfig) -> Result<Self, ShikkhaError> {
        if config.api_keys.is_empty() {
            return Err(ShikkhaError::Config("ai.api_keys must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShikkhaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            pool: Mutex::new(KeyPool::new(config.api_keys.clone())),
        })
    }

    /// Restore quota-exceeded keys (daily quota window reset).
    pub async fn reset_quota(&self) {
        self.pool.lock().await.reset_quota();
    }

    /// Number of currently eligible keys.
    pub async fn eligible_keys(&self) -> usize {
        self.pool.lock().await.eligible_count()
    }

    async fn generate_once(&self, key: &str, prompt: &str) -> Result<String, CallFailure> {
        let url = format!("{}/{}:generateContent", self.api_url, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                CallFailure::Other(ShikkhaError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            CallFailure::Other(ShikkhaError::Provider {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })
        })?;

        if !status.is_success() {
            if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
                if status.as_u16() == 429 || api_err.error.status == "RESOURCE_EXHAUSTED" {
                    return Err(CallFailure::Quota(api_err.error.message));
                }
                return Err(CallFailure::Other(ShikkhaError::Provider {
                    message: format!(
                        "generation API error ({}): {}",
                        api_err.error.status, api_err.error.message
                    ),
                    source: None,
                }));
            }
            if status.as_u16() == 429 {
                return Err(CallFailure::Quota(format!("API returned {status}")));
            }
            return Err(CallFailure::Other(ShikkhaError::Provider {
                message: format!("API returned {status}: {text}"),
                source: None,
            }));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            CallFailure::Other(ShikkhaError::Provider {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })
        })?;

        let output = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if output.is_empty() {
            return Err(CallFailure::Other(ShikkhaError::Provider {
                message: "generation API returned no candidates".into(),
                source: None,
            }));
        }

        Ok(output)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ShikkhaError> {
        loop {
            let key = self
                .pool
                .lock()
                .await
                .next_eligible()
                .map(str::to_string)
                .ok_or_else(|| ShikkhaError::Provider {
                    message: "all API keys are quota-exhausted or disabled".into(),
                    source: None,
                })?;

            match self.generate_once(&key, prompt).await {
                Ok(text) => {
                    debug!(model = %self.model, "generation succeeded");
                    return Ok(text);
                }
                Err(CallFailure::Quota(detail)) => {
                    warn!(detail = %detail, "API key quota exhausted, rotating");
                    self.pool.lock().await.mark_quota_exceeded(&key);
                }
                Err(CallFailure::Other(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str, keys: Vec<String>) -> AiConfig {
        AiConfig {
            api_keys: keys,
            api_url: base_url.to_string(),
            model: "gemini-1.5-flash".into(),
            timeout_secs: 5,
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": text }] } }
            ]
        })
    }

    fn quota_body() -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": 429,
                "status": "RESOURCE_EXHAUSTED",
                "message": "Quota exceeded for requests per day"
            }
        })
    }

    #[test]
    fn new_requires_keys() {
        let config = test_config("http://example", vec![]);
        assert!(GeminiClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "key-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Question 1")))
            .mount(&server)
            .await;

        let client =
            GeminiClient::new(&test_config(&server.uri(), vec!["key-a".into()])).unwrap();
        let text = client.generate("write a question").await.unwrap();
        assert_eq!(text, "Question 1");
    }

    #[tokio::test]
    async fn quota_rotates_to_next_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "key-a"))
            .respond_with(ResponseTemplate::new(429).set_body_json(quota_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("key", "key-b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("from key b")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(
            &server.uri(),
            vec!["key-a".into(), "key-b".into()],
        ))
        .unwrap();

        let text = client.generate("prompt").await.unwrap();
        assert_eq!(text, "from key b");
        assert_eq!(client.eligible_keys().await, 1);
    }

    #[tokio::test]
    async fn all_keys_exhausted_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(quota_body()))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(
            &server.uri(),
            vec!["key-a".into(), "key-b".into()],
        ))
        .unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("quota-exhausted"));
        assert_eq!(client.eligible_keys().await, 0);

        // A quota reset makes the pool usable again.
        client.reset_quota().await;
        assert_eq!(client.eligible_keys().await, 2);
    }

    #[tokio::test]
    async fn non_quota_error_surfaces_without_rotation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "status": "INVALID_ARGUMENT",
                    "message": "Bad model name"
                }
            })))
            .mount(&server)
            .await;

        let client =
            GeminiClient::new(&test_config(&server.uri(), vec!["key-a".into()])).unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("INVALID_ARGUMENT"));
        assert_eq!(client.eligible_keys().await, 1, "key stays active");
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client =
            GeminiClient::new(&test_config(&server.uri(), vec!["key-a".into()])).unwrap();
        assert!(client.generate("prompt").await.is_err());
    }
}
