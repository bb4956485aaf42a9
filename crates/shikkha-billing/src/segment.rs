// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Character-set-aware SMS segmentation and cost calculation.
//!
//! Telecom providers bill long messages per fixed-length segment, and the
//! segment size depends on the encoding: Bengali script forces UCS-2 style
//! encoding with 67 characters per part, while plain ASCII messages fit
//! 160 characters per part.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Characters per segment for messages containing Bengali script.
pub const BENGALI_SEGMENT_CHARS: usize = 67;

/// Characters per segment for plain ASCII messages.
pub const ENGLISH_SEGMENT_CHARS: usize = 160;

/// Billing character-set classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CharacterSet {
    Bengali,
    English,
}

impl CharacterSet {
    /// Segment size in characters for this character set.
    pub fn segment_chars(self) -> usize {
        match self {
            CharacterSet::Bengali => BENGALI_SEGMENT_CHARS,
            CharacterSet::English => ENGLISH_SEGMENT_CHARS,
        }
    }
}

/// Derived billing summary for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsBilling {
    /// Message length in Unicode scalar values.
    pub message_length: u32,
    /// Billable segment count, always at least 1.
    pub sms_parts: u32,
    /// Cost of one part in poisha (minor currency units).
    pub cost_per_part_poisha: u32,
    /// `sms_parts * cost_per_part_poisha`.
    pub total_cost_poisha: u32,
    pub character_set: CharacterSet,
}

/// Whether the message contains any character in the Bengali Unicode
/// block (U+0980..=U+09FF).
pub fn contains_bengali(message: &str) -> bool {
    message.chars().any(|c| ('\u{0980}'..='\u{09FF}').contains(&c))
}

/// Classify a message and compute its segment count and cost.
///
/// Pure and deterministic; safe to call repeatedly for previews. An empty
/// message still bills one part.
pub fn compute_billing(message: &str, cost_per_part_poisha: u32) -> SmsBilling {
    let character_set = if contains_bengali(message) {
        CharacterSet::Bengali
    } else {
        CharacterSet::English
    };

    let length = message.chars().count();
    let sms_parts = length.div_ceil(character_set.segment_chars()).max(1) as u32;

    SmsBilling {
        message_length: length as u32,
        sms_parts,
        cost_per_part_poisha,
        total_cost_poisha: sms_parts * cost_per_part_poisha,
        character_set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COST: u32 = 39;

    #[test]
    fn ascii_message_classified_english() {
        let billing = compute_billing("Class at 5pm today", COST);
        assert_eq!(billing.character_set, CharacterSet::English);
        assert_eq!(billing.sms_parts, 1);
        assert_eq!(billing.total_cost_poisha, 39);
    }

    #[test]
    fn bengali_message_classified_bengali() {
        let billing = compute_billing("আজ ক্লাস বিকাল ৫টায়", COST);
        assert_eq!(billing.character_set, CharacterSet::Bengali);
        assert_eq!(billing.sms_parts, 1);
    }

    #[test]
    fn single_bengali_char_forces_bengali_segments() {
        // A mostly-ASCII message with one Bengali character bills at 67.
        let msg = format!("{}{}", "a".repeat(100), "ক");
        let billing = compute_billing(&msg, COST);
        assert_eq!(billing.character_set, CharacterSet::Bengali);
        assert_eq!(billing.message_length, 101);
        assert_eq!(billing.sms_parts, 2);
    }

    #[test]
    fn ascii_boundary_at_160() {
        assert_eq!(compute_billing(&"x".repeat(160), COST).sms_parts, 1);
        assert_eq!(compute_billing(&"x".repeat(161), COST).sms_parts, 2);
        assert_eq!(compute_billing(&"x".repeat(320), COST).sms_parts, 2);
        assert_eq!(compute_billing(&"x".repeat(321), COST).sms_parts, 3);
    }

    #[test]
    fn bengali_boundary_at_67() {
        let msg_134 = "ক".repeat(134);
        let msg_135 = "ক".repeat(135);
        assert_eq!(compute_billing(&msg_134, COST).sms_parts, 2);
        assert_eq!(compute_billing(&msg_135, COST).sms_parts, 3);
    }

    #[test]
    fn empty_message_bills_one_part() {
        let billing = compute_billing("", COST);
        assert_eq!(billing.message_length, 0);
        assert_eq!(billing.sms_parts, 1);
        assert_eq!(billing.total_cost_poisha, COST);
        assert_eq!(billing.character_set, CharacterSet::English);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // Each Bengali character is 3 bytes in UTF-8 but one character.
        let billing = compute_billing("কখগ", COST);
        assert_eq!(billing.message_length, 3);
    }

    #[test]
    fn total_cost_is_parts_times_rate() {
        let billing = compute_billing(&"y".repeat(400), 45);
        assert_eq!(billing.sms_parts, 3);
        assert_eq!(billing.total_cost_poisha, 135);
    }

    #[test]
    fn character_set_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CharacterSet::Bengali).unwrap(),
            r#""bengali""#
        );
        assert_eq!(CharacterSet::English.to_string(), "english");
    }

    proptest! {
        #[test]
        fn parts_at_least_one(msg in ".*") {
            let billing = compute_billing(&msg, COST);
            prop_assert!(billing.sms_parts >= 1);
        }

        #[test]
        fn ascii_parts_match_ceil_division(msg in "[ -~]*") {
            let billing = compute_billing(&msg, COST);
            prop_assert_eq!(billing.character_set, CharacterSet::English);
            let expected = msg.chars().count().div_ceil(ENGLISH_SEGMENT_CHARS).max(1);
            prop_assert_eq!(billing.sms_parts as usize, expected);
        }

        #[test]
        fn segments_cover_message(msg in ".*") {
            let billing = compute_billing(&msg, COST);
            let size = billing.character_set.segment_chars();
            // All characters fit in the billed parts.
            prop_assert!(billing.sms_parts as usize * size >= msg.chars().count());
        }
    }
}
