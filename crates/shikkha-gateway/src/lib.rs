// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS gateway transport adapter for the Shikkha service.
//!
//! Implements the core [`SmsTransport`](shikkha_core::SmsTransport) seam
//! over the provider's HTTP API: number normalization, the GET submission
//! call, and response-code decoding.

pub mod client;
pub mod codes;
pub mod phone;

pub use client::SmsGatewayClient;
pub use codes::{GatewayStatus, INTERNAL_ERROR_CODE};
