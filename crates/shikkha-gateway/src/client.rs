// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the SMS gateway.
//!
//! One GET per message with `api_key, type, number, senderid, message`
//! query parameters. The gateway answers with either a bare numeric code
//! or a JSON object; both are parsed to the numeric response code and
//! mapped through the code table. The client never raises for an
//! individual send and never retries -- retry policy belongs to the
//! caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use shikkha_billing::contains_bengali;
use shikkha_config::model::GatewayConfig;
use shikkha_core::types::SendOutcome;
use shikkha_core::{ShikkhaError, SmsTransport};

use crate::codes::{GatewayStatus, INTERNAL_ERROR_CODE};
use crate::phone;

/// SMS gateway HTTP client.
#[derive(Debug, Clone)]
pub struct SmsGatewayClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_id: String,
    country_code: String,
}

impl SmsGatewayClient {
    /// Creates a gateway client from configuration.
    ///
    /// Requires `gateway.api_key` and `gateway.sender_id` to be set.
    pub fn new(config: &GatewayConfig) -> Result<Self, ShikkhaError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ShikkhaError::Config("gateway.api_key is required".into()))?;
        let sender_id = config
            .sender_id
            .clone()
            .ok_or_else(|| ShikkhaError::Config("gateway.sender_id is required".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShikkhaError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            sender_id,
            country_code: config.country_code.clone(),
        })
    }

    fn internal_failure(detail: &str) -> SendOutcome {
        SendOutcome {
            success: false,
            code: INTERNAL_ERROR_CODE,
            message: format!("gateway request failed: {detail}"),
            message_id: None,
        }
    }
}

/// Extract the numeric response code and optional message id from a
/// gateway response body.
///
/// Accepts a bare numeric body (`"202"`) or a JSON object carrying a
/// `response_code` field.
fn parse_response(body: &str) -> Option<(u16, Option<String>)> {
    let trimmed = body.trim();

    if let Ok(code) = trimmed.parse::<u16>() {
        return Some((code, None));
    }

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let code = value.get("response_code")?.as_u64()?;
    let message_id = value.get("message_id").and_then(|id| {
        if id.is_null() {
            None
        } else if let Some(s) = id.as_str() {
            Some(s.to_string())
        } else {
            Some(id.to_string())
        }
    });
    Some((u16::try_from(code).ok()?, message_id))
}

#[async_trait]
impl SmsTransport for SmsGatewayClient {
    async fn send(&self, phone: &str, message: &str) -> SendOutcome {
        let number = phone::normalize(phone, &self.country_code);
        let sms_type = if contains_bengali(message) { "unicode" } else { "text" };

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("type", sms_type),
                ("number", number.as_str()),
                ("senderid", self.sender_id.as_str()),
                ("message", message),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(number = %number, error = %e, "gateway request failed");
                return Self::internal_failure(&e.to_string());
            }
        };

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(number = %number, error = %e, "gateway response unreadable");
                return Self::internal_failure(&e.to_string());
            }
        };

        match parse_response(&body) {
            Some((code, message_id)) => {
                let status = GatewayStatus::from_code(code);
                if let GatewayStatus::Unknown(raw) = status {
                    warn!(code = raw, body = %body, "unrecognized gateway response code");
                }
                debug!(number = %number, code, success = status.is_success(), "gateway response");
                SendOutcome {
                    success: status.is_success(),
                    code: status.code(),
                    message: status.description(),
                    message_id,
                }
            }
            None => {
                warn!(number = %number, body = %body, "unparseable gateway response");
                Self::internal_failure("unparseable response body")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            api_url: base_url.to_string(),
            api_key: Some("test-key".into()),
            sender_id: Some("SHIKKHA".into()),
            country_code: "88".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn new_requires_api_key_and_sender_id() {
        let mut config = GatewayConfig::default();
        assert!(SmsGatewayClient::new(&config).is_err());
        config.api_key = Some("k".into());
        assert!(SmsGatewayClient::new(&config).is_err());
        config.sender_id = Some("S".into());
        assert!(SmsGatewayClient::new(&config).is_ok());
    }

    #[test]
    fn parse_plain_numeric_body() {
        assert_eq!(parse_response("202"), Some((202, None)));
        assert_eq!(parse_response(" 1007 \n"), Some((1007, None)));
    }

    #[test]
    fn parse_json_body_with_message_id() {
        let body = r#"{"response_code": 202, "message_id": 9184, "success_message": "ok"}"#;
        assert_eq!(parse_response(body), Some((202, Some("9184".into()))));

        let body = r#"{"response_code": 1002, "error_message": "sender id disabled"}"#;
        assert_eq!(parse_response(body), Some((1002, None)));
    }

    #[test]
    fn parse_garbage_is_none() {
        assert_eq!(parse_response("<html>502 Bad Gateway</html>"), None);
        assert_eq!(parse_response(""), None);
        assert_eq!(parse_response(r#"{"status": "ok"}"#), None);
    }

    #[tokio::test]
    async fn send_success_on_plain_text_202() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("senderid", "SHIKKHA"))
            .and(query_param("number", "8801712345678"))
            .and(query_param("type", "text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("202"))
            .mount(&server)
            .await;

        let client = SmsGatewayClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.send("01712345678", "Class at 5pm").await;

        assert!(outcome.success);
        assert_eq!(outcome.code, 202);
    }

    #[tokio::test]
    async fn bengali_message_sends_unicode_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("type", "unicode"))
            .respond_with(ResponseTemplate::new(200).set_body_string("202"))
            .mount(&server)
            .await;

        let client = SmsGatewayClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.send("01712345678", "আজ ক্লাস বন্ধ").await;
        assert!(outcome.success, "unicode type param expected: {outcome:?}");
    }

    #[tokio::test]
    async fn send_maps_json_failure_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response_code": 1007,
                "error_message": "Balance Insufficient"
            })))
            .mount(&server)
            .await;

        let client = SmsGatewayClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.send("01712345678", "hello").await;

        assert!(!outcome.success);
        assert_eq!(outcome.code, 1007);
        assert!(outcome.message.contains("insufficient gateway balance"));
    }

    #[tokio::test]
    async fn unknown_code_is_surfaced_with_raw_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("4242"))
            .mount(&server)
            .await;

        let client = SmsGatewayClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.send("01712345678", "hello").await;

        assert!(!outcome.success);
        assert_eq!(outcome.code, 4242);
        assert!(outcome.message.contains("4242"));
    }

    #[tokio::test]
    async fn unparseable_body_becomes_internal_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = SmsGatewayClient::new(&test_config(&server.uri())).unwrap();
        let outcome = client.send("01712345678", "hello").await;

        assert!(!outcome.success);
        assert_eq!(outcome.code, INTERNAL_ERROR_CODE);
    }

    #[tokio::test]
    async fn network_error_becomes_internal_failure_not_panic() {
        // Nothing is listening on this port.
        let client = SmsGatewayClient::new(&test_config("http://127.0.0.1:9")).unwrap();
        let outcome = client.send("01712345678", "hello").await;

        assert!(!outcome.success);
        assert_eq!(outcome.code, INTERNAL_ERROR_CODE);
    }
}
