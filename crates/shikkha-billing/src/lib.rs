// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS billing for the Shikkha service.
//!
//! This crate provides the pure, side-effect-free billing calculator:
//! character-set classification, segment counting, and fixed-point cost
//! arithmetic in poisha. No I/O.

pub mod segment;

pub use segment::{
    BENGALI_SEGMENT_CHARS, CharacterSet, ENGLISH_SEGMENT_CHARS, SmsBilling, compute_billing,
    contains_bengali,
};
