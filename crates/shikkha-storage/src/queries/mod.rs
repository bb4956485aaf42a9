// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table cluster.

pub mod credits;
pub mod results;
pub mod roster;
pub mod sms_log;
