// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring schedulers for the Shikkha service.
//!
//! [`MonthlyResultScheduler`] computes and notifies last month's results
//! on the 1st, idempotently; [`MonthEndPreviewScheduler`] warns teachers
//! about upcoming SMS volume the day before month-end.

pub mod monthly;
pub mod preview;

pub use monthly::{MonthlyResultScheduler, MonthlyStats, SchedulerStatus};
pub use preview::MonthEndPreviewScheduler;
