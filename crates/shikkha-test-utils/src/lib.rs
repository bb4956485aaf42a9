// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shikkha integration tests.
//!
//! Provides a scripted mock SMS transport and an in-memory store so the
//! orchestrator and scheduler can be exercised deterministically without
//! a gateway or a database file.

pub mod memory_store;
pub mod mock_transport;

pub use memory_store::{MemoryStore, staged_result};
pub use mock_transport::{MockTransport, failed_outcome, ok_outcome};
