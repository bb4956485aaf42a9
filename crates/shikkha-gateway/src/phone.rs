// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destination number normalization.
//!
//! The gateway requires international format with a leading country code
//! and no separators: `8801XXXXXXXXX`.

/// Normalize a phone number to international-with-country-code form.
///
/// Strips every non-digit, then:
/// - already prefixed with the country code: kept as is
/// - domestic `0…` form (e.g. `017XXXXXXXX`): country code prepended
/// - bare `1…` form with the leading zero also stripped: country code and
///   zero prepended
///
/// Anything else is returned digits-only, for the gateway to reject.
pub fn normalize(phone: &str, country_code: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with(country_code) {
        digits
    } else if digits.starts_with('0') {
        format!("{country_code}{digits}")
    } else if digits.starts_with('1') && digits.len() == 10 {
        format!("{country_code}0{digits}")
    } else {
        digits
    }
}
