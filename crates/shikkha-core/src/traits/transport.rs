// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS transport trait for gateway integrations.

use async_trait::async_trait;

use crate::types::SendOutcome;

/// Sends one message to one phone number via an external gateway.
///
/// `send` is infallible by contract: any network, parse, or gateway
/// failure is reported through the returned [`SendOutcome`], never as an
/// error. The transport performs no retries; retry policy belongs to the
/// caller.
#[async_trait]
pub trait SmsTransport: Send + Sync + 'static {
    async fn send(&self, phone: &str, message: &str) -> SendOutcome;
}
