// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as digit-only dialing prefixes and positive billing
//! rates.

use crate::diagnostic::ConfigError;
use crate::model::ShikkhaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ShikkhaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let cc = config.gateway.country_code.trim();
    if cc.is_empty() || !cc.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.country_code must be a non-empty digit string, got `{}`",
                config.gateway.country_code
            ),
        });
    }

    if config.gateway.api_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.api_url must not be empty".to_string(),
        });
    }

    if config.billing.cost_per_sms_poisha == 0 {
        errors.push(ConfigError::Validation {
            message: "billing.cost_per_sms_poisha must be positive".to_string(),
        });
    }

    if config.scheduler.tick_interval_secs < 60 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.tick_interval_secs must be at least 60, got {}",
                config.scheduler.tick_interval_secs
            ),
        });
    }

    for (i, key) in config.ai.api_keys.iter().enumerate() {
        if key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("ai.api_keys[{i}] must not be blank"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
