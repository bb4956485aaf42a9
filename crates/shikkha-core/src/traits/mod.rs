// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the billing/dispatch core.

pub mod ledger;
pub mod store;
pub mod textgen;
pub mod transport;

pub use ledger::CreditLedger;
pub use store::Store;
pub use textgen::TextGenerator;
pub use transport::SmsTransport;
