// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway response-code table.
//!
//! The gateway answers every submission with a numeric code. 202 is the
//! single success code; the rest are distinct failure reasons. Codes not
//! in the table map to the tagged [`GatewayStatus::Unknown`] outcome so
//! new gateway codes can be triaged without code changes.

/// Code used when the request itself failed (network error, unreadable
/// response) before a gateway code could be obtained.
pub const INTERNAL_ERROR_CODE: u16 = 1005;

/// Decoded outcome of one gateway submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    /// 202 -- accepted for delivery.
    Submitted,
    /// 1001
    InvalidNumber,
    /// 1002
    SenderIdDisabled,
    /// 1003
    MissingRequiredFields,
    /// 1005 -- also used for our own transport-level failures.
    InternalError,
    /// 1006
    BalanceValidityUnavailable,
    /// 1007
    InsufficientGatewayBalance,
    /// 1011
    UserIdNotFound,
    /// 1012
    MaskingMustBeBengali,
    /// 1013
    SenderIdGatewayNotFound,
    /// 1014
    SenderTypeNameNotFound,
    /// 1015
    NoValidGateway,
    /// 1016
    ActivePriceInfoNotFound,
    /// 1017
    PriceInfoNotFound,
    /// 1018
    AccountDisabled,
    /// 1019
    SenderTypePriceDisabled,
    /// 1020
    ParentAccountNotFound,
    /// 1021
    ParentPriceNotFound,
    /// 1031
    AccountNotVerified,
    /// 1032
    IpNotWhitelisted,
    /// Any code the table does not know.
    Unknown(u16),
}

impl GatewayStatus {
    /// Decode a numeric gateway response code.
    pub fn from_code(code: u16) -> Self {
        match code {
            202 => Self::Submitted,
            1001 => Self::InvalidNumber,
            1002 => Self::SenderIdDisabled,
            1003 => Self::MissingRequiredFields,
            1005 => Self::InternalError,
            1006 => Self::BalanceValidityUnavailable,
            1007 => Self::InsufficientGatewayBalance,
            1011 => Self::UserIdNotFound,
            1012 => Self::MaskingMustBeBengali,
            1013 => Self::SenderIdGatewayNotFound,
            1014 => Self::SenderTypeNameNotFound,
            1015 => Self::NoValidGateway,
            1016 => Self::ActivePriceInfoNotFound,
            1017 => Self::PriceInfoNotFound,
            1018 => Self::AccountDisabled,
            1019 => Self::SenderTypePriceDisabled,
            1020 => Self::ParentAccountNotFound,
            1021 => Self::ParentPriceNotFound,
            1031 => Self::AccountNotVerified,
            1032 => Self::IpNotWhitelisted,
            other => Self::Unknown(other),
        }
    }

    /// The numeric code this outcome corresponds to.
    pub fn code(self) -> u16 {
        match self {
            Self::Submitted => 202,
            Self::InvalidNumber => 1001,
            Self::SenderIdDisabled => 1002,
            Self::MissingRequiredFields => 1003,
            Self::InternalError => 1005,
            Self::BalanceValidityUnavailable => 1006,
            Self::InsufficientGatewayBalance => 1007,
            Self::UserIdNotFound => 1011,
            Self::MaskingMustBeBengali => 1012,
            Self::SenderIdGatewayNotFound => 1013,
            Self::SenderTypeNameNotFound => 1014,
            Self::NoValidGateway => 1015,
            Self::ActivePriceInfoNotFound => 1016,
            Self::PriceInfoNotFound => 1017,
            Self::AccountDisabled => 1018,
            Self::SenderTypePriceDisabled => 1019,
            Self::ParentAccountNotFound => 1020,
            Self::ParentPriceNotFound => 1021,
            Self::AccountNotVerified => 1031,
            Self::IpNotWhitelisted => 1032,
            Self::Unknown(code) => code,
        }
    }

    /// Whether this outcome means the message was accepted.
    pub fn is_success(self) -> bool {
        self == Self::Submitted
    }

    /// Human-readable description of the outcome.
    pub fn description(self) -> String {
        match self {
            Self::Submitted => "SMS submitted successfully".into(),
            Self::InvalidNumber => "invalid number".into(),
            Self::SenderIdDisabled => "sender id not correct or disabled".into(),
            Self::MissingRequiredFields => "required fields missing".into(),
            Self::InternalError => "internal error".into(),
            Self::BalanceValidityUnavailable => "balance validity not available".into(),
            Self::InsufficientGatewayBalance => "insufficient gateway balance".into(),
            Self::UserIdNotFound => "user id not found".into(),
            Self::MaskingMustBeBengali => "masking sms must be sent in Bengali".into(),
            Self::SenderIdGatewayNotFound => "sender id has no gateway for this api key".into(),
            Self::SenderTypeNameNotFound => "sender type name not found for this api key".into(),
            Self::NoValidGateway => "sender id has no valid gateway for this api key".into(),
            Self::ActivePriceInfoNotFound => {
                "active price info not found for this sender id".into()
            }
            Self::PriceInfoNotFound => "price info not found for this sender id".into(),
            Self::AccountDisabled => "account is disabled".into(),
            Self::SenderTypePriceDisabled => "sender type price is disabled".into(),
            Self::ParentAccountNotFound => "parent account not found".into(),
            Self::ParentPriceNotFound => "parent active price not found".into(),
            Self::AccountNotVerified => "account not verified".into(),
            Self::IpNotWhitelisted => "IP not whitelisted".into(),
            Self::Unknown(code) => format!("unrecognized gateway response code {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_code_maps_to_submitted() {
        let status = GatewayStatus::from_code(202);
        assert!(status.is_success());
        assert_eq!(status.code(), 202);
    }

    #[test]
    fn known_failure_codes_round_trip() {
        for code in [
            1001, 1002, 1003, 1005, 1006, 1007, 1011, 1012, 1013, 1014, 1015, 1016, 1017,
            1018, 1019, 1020, 1021, 1031, 1032,
        ] {
            let status = GatewayStatus::from_code(code);
            assert!(!status.is_success(), "{code} is a failure code");
            assert_eq!(status.code(), code, "code round-trips through the table");
            assert!(
                !matches!(status, GatewayStatus::Unknown(_)),
                "{code} should be a named outcome"
            );
        }
    }

    #[test]
    fn unknown_codes_are_tagged_not_generic() {
        let status = GatewayStatus::from_code(4242);
        assert_eq!(status, GatewayStatus::Unknown(4242));
        assert_eq!(status.code(), 4242);
        assert!(status.description().contains("4242"));
    }

    #[test]
    fn insufficient_gateway_balance_is_distinct() {
        // Upstream balance exhaustion must stay distinguishable from our
        // own ledger's pre-flight rejection.
        let status = GatewayStatus::from_code(1007);
        assert_eq!(status, GatewayStatus::InsufficientGatewayBalance);
        assert!(status.description().contains("gateway"));
    }
}
