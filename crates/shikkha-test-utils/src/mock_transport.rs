// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS transport for deterministic testing.
//!
//! `MockTransport` implements `SmsTransport` with pre-scripted outcomes,
//! enabling fast, CI-runnable tests without a gateway. Every call is
//! recorded so tests can assert on what was (or was not) sent.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shikkha_core::SmsTransport;
use shikkha_core::types::SendOutcome;

/// A successful submission outcome.
pub fn ok_outcome() -> SendOutcome {
    SendOutcome {
        success: true,
        code: 202,
        message: "SMS submitted successfully".into(),
        message_id: None,
    }
}

/// A failed submission outcome with the given gateway code.
pub fn failed_outcome(code: u16, message: &str) -> SendOutcome {
    SendOutcome {
        success: false,
        code,
        message: message.into(),
        message_id: None,
    }
}

/// A mock transport that returns pre-scripted outcomes.
///
/// Outcomes are popped from a FIFO queue; when the queue is empty, sends
/// succeed. Calls are recorded as `(phone, message)` pairs.
#[derive(Clone)]
pub struct MockTransport {
    outcomes: Arc<Mutex<VecDeque<SendOutcome>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTransport {
    /// Create a mock transport where every send succeeds.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock transport pre-loaded with the given outcomes.
    pub fn with_outcomes(outcomes: Vec<SendOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append an outcome to the script.
    pub async fn push_outcome(&self, outcome: SendOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// All `(phone, message)` pairs sent so far.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }

    /// Number of transport calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsTransport for MockTransport {
    async fn send(&self, phone: &str, message: &str) -> SendOutcome {
        self.calls
            .lock()
            .await
            .push((phone.to_string(), message.to_string()));
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(ok_outcome)
    }
}
